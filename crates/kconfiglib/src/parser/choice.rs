use crate::parser::{
    config::merge_type, Comment, Config, Expected, KConfigError, LocExpr, LocString, Located, Location,
    PeekableTokenLines, Prompt, Token, TokenLine, Type,
};

/// Choice entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Choice {
    /// The name of the choice, if it was given one.
    pub name: Option<LocString>,

    /// The type of the choice. Only `bool` and `tristate` are accepted.
    pub r#type: Type,

    /// Optional prompt for the choice.
    pub prompt: Option<Prompt>,

    /// Optional help text for the choice.
    pub help: Option<LocString>,

    /// Member symbols for the choice, represented as [`Config`] entries.
    pub configs: Vec<Config>,

    /// Default values for the choice.
    pub defaults: Vec<ChoiceDefault>,

    /// Dependencies for this choice from `depends on` statements.
    pub depends_on: Vec<LocExpr>,

    /// Whether the choice was marked `optional` (no member needs to be set).
    pub optional: bool,

    /// Comment blocks appearing inside the choice.
    pub comments: Vec<Comment>,

    /// The location of the `choice` keyword.
    pub location: Location,
}

/// A possible default for a choice entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceDefault {
    /// The member symbol to choose for this default.
    pub target: LocString,

    /// An optional condition for this default. If unspecified, this is equivalent to `y` (always true).
    pub condition: Option<LocExpr>,
}

impl Choice {
    /// Parse a choice block.
    ///
    /// Parameters:
    /// * `lines`: The lines to parse. The first line must start with a [`Token::Choice`] token,
    ///   optionally followed by a symbol naming the choice.
    pub fn parse(lines: &mut PeekableTokenLines) -> Result<Self, KConfigError> {
        let Some(mut tokens) = lines.next() else {
            panic!("Expected choice block");
        };

        let Some(blk_cmd) = tokens.next() else {
            panic!("Expected choice command");
        };
        assert_eq!(blk_cmd.token, Token::Choice);
        let location = blk_cmd.location();

        let name = match tokens.next() {
            None => None,
            Some(t) => match t.symbol_value() {
                Some(s) => Some(s.to_loc_string()),
                None => return Err(KConfigError::unexpected(t, Expected::Symbol, t.location())),
            },
        };

        if let Some(unexpected) = tokens.next() {
            return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
        }

        let mut r#type = None;
        let mut prompt = None;
        let mut help = None;
        let mut configs = Vec::new();
        let mut defaults = Vec::new();
        let mut depends_on = Vec::new();
        let mut optional = false;
        let mut comments = Vec::new();
        let mut last_loc = location;

        loop {
            let Some(tokens) = lines.peek() else {
                return Err(KConfigError::unexpected_eof(Expected::EndChoice, last_loc));
            };

            let Some(cmd) = tokens.peek() else {
                panic!("Expected choice entry");
            };

            last_loc = cmd.location();

            match cmd.token {
                Token::EndChoice => {
                    _ = lines.next();
                    break;
                }

                Token::Config => {
                    configs.push(Config::parse(lines)?);
                }

                Token::Comment => {
                    comments.push(Comment::parse(lines)?);
                }

                Token::Bool | Token::Tristate => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    let Some(type_token) = tokens.next() else {
                        panic!("Expected type token");
                    };

                    let choice_name = name.as_ref().map_or("<unnamed>", |n| n.as_str());
                    merge_type(&mut r#type, type_token.r#type().unwrap(), choice_name, type_token.location())?;

                    if !tokens.is_empty() {
                        prompt = Some(Prompt::parse(type_token.location(), &mut tokens)?);
                    }
                }

                Token::Hex | Token::Int | Token::String => {
                    return Err(KConfigError::parse(
                        format!("choice type must be bool or tristate, not {cmd}"),
                        cmd.location(),
                    ));
                }

                Token::Default => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    defaults.push(ChoiceDefault::parse(&mut tokens)?);
                }

                Token::Depends => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    depends_on.push(LocExpr::parse_depends_on(&mut tokens)?);
                }

                Token::Help => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    help = Some(tokens.read_help()?);
                }

                Token::Optional => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    _ = tokens.next();

                    if let Some(unexpected) = tokens.next() {
                        return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
                    }

                    optional = true;
                }

                Token::Prompt => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    let Some(prompt_cmd) = tokens.next() else {
                        panic!("Expected prompt command");
                    };
                    prompt = Some(Prompt::parse(prompt_cmd.location(), &mut tokens)?);
                }

                Token::If => {
                    return Err(KConfigError::parse("if blocks are not supported inside choice", cmd.location()));
                }

                _ => return Err(KConfigError::unexpected(cmd, Expected::ChoiceEntry, cmd.location())),
            }
        }

        let r#type = r#type.unwrap_or(Type::Unknown);

        Ok(Self {
            name,
            r#type,
            prompt,
            help,
            configs,
            defaults,
            depends_on,
            optional,
            comments,
            location,
        })
    }
}

impl Located for Choice {
    fn location(&self) -> Location {
        self.location
    }
}

impl ChoiceDefault {
    /// Parse the remainder of a `default` line within a choice block.
    pub fn parse(tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let (cmd, target) = tokens.read_cmd_sym(false)?;
        assert_eq!(cmd.token, Token::Default);

        let condition = tokens.read_if_expr(true)?;

        Ok(Self {
            target,
            condition,
        })
    }
}

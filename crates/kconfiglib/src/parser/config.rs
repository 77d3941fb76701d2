use crate::parser::{
    Expected, KConfigError, LocExpr, LocLitValue, LocString, Located, Location, PeekableTokenLines, Prompt, Token,
    TokenLine, Type,
};

/// Configuration entry from a `config` or `menuconfig` block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The name of the symbol for this config block.
    pub name: LocString,

    /// The type of this config block.
    pub r#type: Type,

    /// Prompts for this config. An entry may declare more than one.
    pub prompts: Vec<Prompt>,

    /// Help text for this config. `Some("")` when a `help` block was present but empty.
    pub help: Option<LocString>,

    /// Default values for the config, in declaration order.
    pub defaults: Vec<ConfigDefault>,

    /// Environment variable bound to this config via `option env=`.
    pub env: Option<LocString>,

    /// Whether `option allnoconfig_y` was given.
    pub allnoconfig_y: bool,

    /// Whether `option defconfig_list` was given.
    pub defconfig_list: bool,

    /// Whether `option modules` was given.
    pub modules: bool,

    /// Dependencies for this config from `depends on` statements.
    pub depends_on: Vec<LocExpr>,

    /// Other configs that are selected by this config.
    pub selects: Vec<ConfigTarget>,

    /// Other configs that are implied by this config.
    pub implies: Vec<ConfigTarget>,

    /// Ranges of acceptable values for this config.
    pub ranges: Vec<ConfigRange>,
}

/// Possible default for a configuration entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigDefault {
    /// The value of the default.
    pub value: LocExpr,

    /// An optional condition for this default. If unspecified, this is equivalent to `y` (always true).
    pub condition: Option<LocExpr>,
}

/// The target of a `select` or `imply` statement along with an optional associated condition.
///
/// These statements are in one of the following forms:
/// * `select TARGET`
/// * `select TARGET if EXPR`
/// * `imply TARGET`
/// * `imply TARGET if EXPR`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigTarget {
    /// The name of the target of this `select` or `imply` statement.
    pub target_name: LocString,

    /// An optional condition for this `select` or `imply` statement. If unspecified, this is equivalent to `y` (always true).
    pub condition: Option<LocExpr>,
}

/// Range for a configuration entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigRange {
    /// The starting value of the range.
    pub start: LocLitValue,

    /// The ending value of the range.
    pub end: LocLitValue,

    /// An optional condition for this range. If unspecified, this is equivalent to `y` (always true).
    pub condition: Option<LocExpr>,
}

/// A single `option` attribute on a config entry.
enum ConfigOption {
    AllNoConfigY,
    DefConfigList,
    Env(LocString),
    Modules,
}

impl Config {
    /// Parse a `config` or `menuconfig` block.
    ///
    /// Parameters:
    /// * `lines`: The lines to parse. The first line must start with a [`Token::Config`] or
    ///   [`Token::MenuConfig`] token.
    pub fn parse(lines: &mut PeekableTokenLines) -> Result<Self, KConfigError> {
        let Some(mut tokens) = lines.next() else {
            panic!("Expected config block");
        };

        let (blk_cmd, name) = tokens.read_cmd_sym(true)?;

        assert!(
            matches!(blk_cmd.token, Token::Config | Token::MenuConfig),
            "Expected config or menuconfig: {blk_cmd:?}"
        );

        let mut r#type = None;
        let mut prompts = Vec::new();
        let mut help = None;
        let mut defaults = Vec::new();
        let mut env = None;
        let mut allnoconfig_y = false;
        let mut defconfig_list = false;
        let mut modules = false;
        let mut depends_on = Vec::new();
        let mut selects = Vec::new();
        let mut implies = Vec::new();
        let mut ranges = Vec::new();

        loop {
            let Some(tokens) = lines.peek() else {
                break;
            };

            let Some(cmd) = tokens.peek() else {
                panic!("Expected config entry");
            };

            match cmd.token {
                _ if cmd.token.starts_block() => {
                    // Next block; stop here.
                    break;
                }

                Token::Bool | Token::Hex | Token::Int | Token::String | Token::Tristate => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    let Some(type_token) = tokens.next() else {
                        panic!("Expected type token");
                    };

                    merge_type(&mut r#type, type_token.r#type().unwrap(), name.as_str(), type_token.location())?;

                    if !tokens.is_empty() {
                        prompts.push(Prompt::parse(type_token.location(), &mut tokens)?);
                    }
                }

                Token::DefBool | Token::DefHex | Token::DefInt | Token::DefString | Token::DefTristate => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    let Some(def_cmd) = tokens.next() else {
                        panic!("Expected def_* token");
                    };

                    merge_type(&mut r#type, def_cmd.token.def_type().unwrap(), name.as_str(), def_cmd.location())?;

                    let value = LocExpr::parse(def_cmd.location(), &mut tokens)?;
                    let condition = tokens.read_if_expr(true)?;
                    defaults.push(ConfigDefault {
                        value,
                        condition,
                    });
                }

                Token::Default => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    defaults.push(ConfigDefault::parse(&mut tokens)?);
                }

                Token::Depends => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    depends_on.push(LocExpr::parse_depends_on(&mut tokens)?);
                }

                Token::Prompt => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    _ = tokens.next();
                    prompts.push(Prompt::parse(cmd.location(), &mut tokens)?);
                }

                Token::Help => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    help = Some(tokens.read_help()?);
                }

                Token::Imply => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    implies.push(ConfigTarget::parse(&mut tokens)?);
                }

                Token::Select => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    selects.push(ConfigTarget::parse(&mut tokens)?);
                }

                Token::Range => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    ranges.push(ConfigRange::parse(&mut tokens)?);
                }

                Token::Option => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };

                    match parse_option(&mut tokens)? {
                        ConfigOption::AllNoConfigY => allnoconfig_y = true,
                        ConfigOption::DefConfigList => defconfig_list = true,
                        ConfigOption::Env(var) => env = Some(var),
                        ConfigOption::Modules => modules = true,
                    }
                }

                _ => return Err(KConfigError::unexpected(cmd, Expected::Eol, cmd.location())),
            }
        }

        let r#type = r#type.unwrap_or(Type::Unknown);

        Ok(Self {
            name,
            r#type,
            prompts,
            defaults,
            env,
            allnoconfig_y,
            defconfig_list,
            modules,
            depends_on,
            selects,
            implies,
            ranges,
            help,
        })
    }
}

impl Located for Config {
    fn location(&self) -> Location {
        self.name.location()
    }
}

/// Record a type for the entry, rejecting conflicts with an earlier type in the same block.
pub(crate) fn merge_type(
    existing: &mut Option<Type>,
    new_type: Type,
    name: &str,
    location: Location,
) -> Result<(), KConfigError> {
    match existing {
        None => {
            *existing = Some(new_type);
            Ok(())
        }
        Some(t) if *t == new_type => Ok(()),
        Some(t) => {
            Err(KConfigError::parse(format!("config {name} given conflicting type {new_type} (already {t})"), location))
        }
    }
}

/// Parse an `option` line: `option env="VAR"`, `option defconfig_list`, `option modules`, or
/// `option allnoconfig_y`.
fn parse_option(tokens: &mut TokenLine) -> Result<ConfigOption, KConfigError> {
    let Some(cmd) = tokens.next() else {
        panic!("Expected option command");
    };

    let Some(attr) = tokens.next() else {
        return Err(KConfigError::missing(Expected::Env, cmd.location()));
    };

    let option = match attr.token {
        Token::AllNoConfigY => ConfigOption::AllNoConfigY,
        Token::DefConfigList => ConfigOption::DefConfigList,
        Token::Modules => ConfigOption::Modules,
        Token::Env => {
            let Some(eq_token) = tokens.next() else {
                return Err(KConfigError::missing(Expected::Eq, attr.location()));
            };

            if eq_token.token != Token::Eq {
                return Err(KConfigError::unexpected(eq_token, Expected::Eq, eq_token.location()));
            }

            let Some(env_name) = tokens.next() else {
                return Err(KConfigError::missing(Expected::StringLiteral, eq_token.location()));
            };

            let Some(env_name) = env_name.string_literal_value() else {
                return Err(KConfigError::unexpected(env_name, Expected::StringLiteral, env_name.location()));
            };

            ConfigOption::Env(env_name.to_loc_string())
        }
        _ => return Err(KConfigError::parse(format!("unknown option {attr}"), attr.location())),
    };

    if let Some(unexpected) = tokens.next() {
        return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
    }

    Ok(option)
}

impl ConfigDefault {
    /// Parse the remainder of `default` statement within a config block (everything after the `default` keyword).
    pub fn parse(tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let Some(default_cmd) = tokens.next() else {
            panic!("Expected default command");
        };

        let value = LocExpr::parse(default_cmd.location(), tokens)?;
        let condition = tokens.read_if_expr(true)?;

        Ok(Self {
            value,
            condition,
        })
    }
}

impl ConfigTarget {
    /// Parse the remainder of a `select` or `imply` statement (after the `select` or `imply` keyword).
    pub fn parse(tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let (cmd, target_name) = tokens.read_cmd_sym(false)?;
        assert!(matches!(cmd.token, Token::Select | Token::Imply));

        let condition = tokens.read_if_expr(true)?;

        Ok(Self {
            target_name,
            condition,
        })
    }
}

impl ConfigRange {
    /// Parse the remainder of a range statement (after the `range` keyword).
    pub fn parse(tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let Some(range_token) = tokens.next() else {
            panic!("Expected range command");
        };

        let Some(start) = tokens.next() else {
            return Err(KConfigError::missing(Expected::LitValue, range_token.location()));
        };

        let Some(start) = start.literal_value() else {
            return Err(KConfigError::unexpected(start, Expected::LitValue, start.location()));
        };

        let Some(end) = tokens.next() else {
            return Err(KConfigError::missing(Expected::LitValue, range_token.location()));
        };

        let Some(end) = end.literal_value() else {
            return Err(KConfigError::unexpected(end, Expected::LitValue, end.location()));
        };

        let condition = tokens.read_if_expr(true)?;

        Ok(Self {
            start,
            end,
            condition,
        })
    }
}

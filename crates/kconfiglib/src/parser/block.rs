use {
    crate::{
        context::context_closure,
        parser::{
            Choice, Comment, Config, Expected, IfBlock, KConfigError, LocString, Located, Location, Menu,
            PeekableTokenLines, Source, Token,
        },
        Context,
    },
    shellexpand::env_with_context,
    std::{env::VarError, mem, path::Path},
};

/// A top-level Kconfig block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Block {
    /// A `choice` block.
    Choice(Choice),

    /// A `comment` block.
    Comment(Comment),

    /// A `config` block.
    Config(Config),

    /// An `if` conditional inclusion block.
    If(IfBlock),

    /// A `mainmenu` title.
    Mainmenu(LocString),

    /// A `menu` block.
    Menu(Menu),

    /// A `menuconfig` block.
    MenuConfig(Config),

    /// A `source` directive that has not been evaluated yet.
    Source(Source),
}

impl Block {
    /// Parse the next block from the stream.
    ///
    /// Returns `Ok(None)` when the stream is exhausted.
    pub fn parse(lines: &mut PeekableTokenLines, base_dir: &Path) -> Result<Option<Self>, KConfigError> {
        let Some(tokens) = lines.peek() else {
            return Ok(None);
        };

        let Some(cmd) = tokens.peek() else {
            panic!("Expected block command");
        };

        match cmd.token {
            Token::Choice => Ok(Some(Self::Choice(Choice::parse(lines)?))),
            Token::Comment => Ok(Some(Self::Comment(Comment::parse(lines)?))),
            Token::Config => Ok(Some(Self::Config(Config::parse(lines)?))),
            Token::If => Ok(Some(Self::If(IfBlock::parse(lines, base_dir)?))),

            Token::Mainmenu => {
                let mut tokens = lines.next().unwrap();
                let (blk_cmd, title) = tokens.read_cmd_str_lit(true)?;
                assert_eq!(blk_cmd.token, Token::Mainmenu);
                Ok(Some(Self::Mainmenu(title)))
            }

            Token::Menu => Ok(Some(Self::Menu(Menu::parse(lines, base_dir)?))),
            Token::MenuConfig => Ok(Some(Self::MenuConfig(Config::parse(lines)?))),

            Token::Source | Token::OSource | Token::RSource | Token::ORSource => {
                let mut tokens = lines.next().unwrap();
                Ok(Some(Self::Source(Source::parse(&mut tokens, base_dir)?)))
            }

            Token::EndChoice => Err(KConfigError::parse("endchoice without matching choice", cmd.location())),
            Token::EndIf => Err(KConfigError::parse("endif without matching if", cmd.location())),
            Token::EndMenu => Err(KConfigError::parse("endmenu without matching menu", cmd.location())),

            _ => Err(KConfigError::unexpected(cmd, Expected::Block, cmd.location())),
        }
    }
}

impl Located for Block {
    fn location(&self) -> Location {
        match self {
            Self::Choice(c) => c.location(),
            Self::Comment(c) => c.location(),
            Self::Config(c) => c.location(),
            Self::If(i) => i.location(),
            Self::Mainmenu(t) => t.location(),
            Self::Menu(m) => m.location(),
            Self::MenuConfig(c) => c.location(),
            Self::Source(s) => s.location(),
        }
    }
}

/// Replace `source` directives in a block tree with the contents of the files they name, and
/// expand `$VAR` references in `mainmenu` titles.
pub trait ExpandSources {
    /// Evaluate and splice `source` directives, recursing into `if` and `menu` blocks.
    fn expand_sources<C>(&mut self, base_dir: &Path, context: &C) -> Result<(), KConfigError>
    where
        C: Context;
}

impl ExpandSources for Vec<Block> {
    fn expand_sources<C>(&mut self, base_dir: &Path, context: &C) -> Result<(), KConfigError>
    where
        C: Context,
    {
        let mut result = Vec::with_capacity(self.len());

        for mut block in mem::take(self) {
            match block {
                Block::Source(source) => {
                    // The sourced file expands its own directives while it is parsed.
                    result.extend(source.evaluate(base_dir, context)?);
                }

                Block::If(ref mut ifblock) => {
                    ifblock.items.expand_sources(base_dir, context)?;
                    result.push(block);
                }

                Block::Menu(ref mut menu) => {
                    menu.blocks.expand_sources(base_dir, context)?;
                    result.push(block);
                }

                Block::Mainmenu(ref mut title) => {
                    match env_with_context(title.as_str(), context_closure(context)) {
                        Ok(expanded) => title.value = expanded.into_owned(),
                        Err(e) => {
                            return Err(match e.cause {
                                VarError::NotPresent => KConfigError::unknown_env(e.var_name, title.location()),
                                VarError::NotUnicode(_) => KConfigError::invalid_env(e.var_name, title.location()),
                            })
                        }
                    }

                    result.push(block);
                }

                _ => result.push(block),
            }
        }

        *self = result;
        Ok(())
    }
}

use {
    crate::{
        context::context_closure,
        parser::{Block, KConfig, KConfigError, KConfigErrorKind, LocString, Located, Location, Token, TokenLine},
        Context,
    },
    shellexpand::env_with_context,
    std::{
        env::VarError,
        io::ErrorKind as IoErrorKind,
        path::{Path, PathBuf},
    },
};

/// Source block type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    /// The filename to read. Environment references of the form `${VAR}` are expanded when the
    /// source is evaluated.
    pub filename: LocString,

    /// Whether the source statement is optional (`osource` or `orsource`).
    pub optional: bool,

    /// Whether the filename is relative to the current Kconfig file (`orsource` or `rsource`).
    pub relative: bool,

    /// The base directory for the source.
    pub base_dir: PathBuf,
}

impl Source {
    /// Parse a source line.
    pub fn parse(tokens: &mut TokenLine, base_dir: &Path) -> Result<Self, KConfigError> {
        let (cmd, filename) = tokens.read_cmd_str_lit(true)?;
        assert!(cmd.token.is_source());

        let optional = matches!(cmd.token, Token::OSource | Token::ORSource);
        let relative = matches!(cmd.token, Token::RSource | Token::ORSource);

        let base_dir = if relative {
            filename.location().filename.parent().unwrap_or_else(|| Path::new("/"))
        } else {
            base_dir
        }
        .to_path_buf();

        Ok(Source {
            filename,
            optional,
            relative,
            base_dir,
        })
    }

    /// Evaluate the source directive and return the blocks found.
    ///
    /// Missing files are an error unless the source is optional, in which case an empty block
    /// list is returned.
    pub fn evaluate<C>(&self, base_dir: &Path, context: &C) -> Result<Vec<Block>, KConfigError>
    where
        C: Context,
    {
        // Expand any ${ENV} variables in the filename.
        let s_filename = match env_with_context(self.filename.as_str(), context_closure(context)) {
            Ok(s) => s,
            Err(e) => {
                return Err(match e.cause {
                    VarError::NotPresent => KConfigError::unknown_env(e.var_name, self.filename.location()),
                    VarError::NotUnicode(_) => KConfigError::invalid_env(e.var_name, self.filename.location()),
                })
            }
        };

        let s_filename = self.base_dir.join(s_filename.as_ref());
        log::debug!("sourcing {}, optional={}", s_filename.display(), self.optional);

        match KConfig::parse_filename(&s_filename, base_dir, context) {
            Ok(s_kconfig) => Ok(s_kconfig.blocks),
            Err(e) => {
                let KConfigErrorKind::Io(io_error) = &e.kind else {
                    return Err(e);
                };

                if io_error.kind() != IoErrorKind::NotFound || !self.optional {
                    return Err(e);
                }

                log::debug!("ignoring missing optional source {}", s_filename.display());
                Ok(Vec::new())
            }
        }
    }
}

impl Located for Source {
    fn location(&self) -> Location {
        self.filename.location()
    }
}

use {
    crate::parser::{Block, Expected, KConfigError, LocExpr, LocString, Located, Location, PeekableTokenLines, Token},
    std::path::Path,
};

/// A menu block in a Kconfig file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Menu {
    /// The title of the menu.
    pub title: LocString,

    /// The items in the menu.
    pub blocks: Vec<Block>,

    /// Dependencies for this menu from `depends on` statements.
    pub depends_on: Vec<LocExpr>,

    /// Visibility conditions from `visible if` statements. An empty list means the menu is
    /// visible by default (equivalent to `y`).
    pub visibility: Vec<LocExpr>,
}

impl Menu {
    /// Parse a menu block.
    ///
    /// Parameters:
    /// * `lines`: The lines to parse. The first line must start with a [`Token::Menu`] token.
    /// * `base_dir`: The base directory used to resolve `source` statements in nested blocks.
    pub fn parse(lines: &mut PeekableTokenLines, base_dir: &Path) -> Result<Self, KConfigError> {
        let mut tokens = lines.next().unwrap();
        assert!(!tokens.is_empty());

        let (blk_cmd, title) = tokens.read_cmd_str_lit(true)?;
        assert_eq!(blk_cmd.token, Token::Menu);

        let mut last_loc = title.location();
        let mut blocks = Vec::new();
        let mut depends_on = Vec::new();
        let mut visibility = Vec::new();

        loop {
            let Some(tokens) = lines.peek() else {
                return Err(KConfigError::unexpected_eof(Expected::EndMenu, last_loc));
            };

            let Some(cmd) = tokens.peek() else {
                panic!("Expected menu entry");
            };

            last_loc = cmd.location();

            match cmd.token {
                Token::EndMenu => {
                    _ = lines.next();
                    break;
                }

                Token::Depends => {
                    let mut tokens = lines.next().unwrap();
                    let depends = LocExpr::parse_depends_on(&mut tokens)?;
                    depends_on.push(depends);
                }

                Token::Visible => {
                    let mut tokens = lines.next().unwrap();
                    let vis = LocExpr::parse_visible_if(&mut tokens)?;
                    visibility.push(vis);
                }

                _ => {
                    let Some(block) = Block::parse(lines, base_dir)? else {
                        return Err(KConfigError::unexpected_eof(Expected::EndMenu, last_loc));
                    };

                    blocks.push(block);
                }
            }
        }

        Ok(Self {
            title,
            blocks,
            depends_on,
            visibility,
        })
    }
}

impl Located for Menu {
    fn location(&self) -> Location {
        self.title.location()
    }
}

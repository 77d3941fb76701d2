use {
    crate::{
        parser::{parse_stream, Block, ExpandSources, KConfigError, PeekableChars, PeekableTokenLinesExt},
        Context,
    },
    std::{fs::File, io::Read, path::Path},
};

/// A parsed Kconfig hierarchy.
#[derive(Clone, Debug, Default)]
pub struct KConfig {
    /// The blocks found in the hierarchy.
    pub blocks: Vec<Block>,
}

impl KConfig {
    /// Read a full Kconfig tree starting with the given Kconfig file.
    ///
    /// This recursively reads any configuration files in `source` (or `osource`, `orsource`,
    /// `rsource`) statements.
    pub fn parse<C>(filename: &Path, base_dir: &Path, context: &C) -> Result<Self, KConfigError>
    where
        C: Context,
    {
        Self::parse_filename(filename, base_dir, context)
    }

    /// Parse the given file.
    pub fn parse_filename<C>(filename: &Path, base_dir: &Path, context: &C) -> Result<Self, KConfigError>
    where
        C: Context,
    {
        let mut file = File::open(filename)?;
        let mut input = String::new();
        file.read_to_string(&mut input)?;
        Self::parse_str(PeekableChars::new(input.as_str(), filename), base_dir, context)
    }

    /// Parse a Kconfig file from the given string input, evaluating `source` statements.
    pub fn parse_str<C>(input: PeekableChars, base_dir: &Path, context: &C) -> Result<Self, KConfigError>
    where
        C: Context,
    {
        let mut kconfig = Self::parse_str_raw(input, base_dir)?;
        kconfig.blocks.expand_sources(base_dir, context)?;

        Ok(kconfig)
    }

    /// Parse a Kconfig file from the given string input without evaluating `source` statements.
    pub(crate) fn parse_str_raw(input: PeekableChars, base_dir: &Path) -> Result<Self, KConfigError> {
        let tokens = parse_stream(input)?;
        let mut lines = tokens.peek_lines();
        let mut blocks = Vec::new();

        while let Some(block) = Block::parse(&mut lines, base_dir)? {
            blocks.push(block);
        }

        Ok(Self {
            blocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{Block, KConfig, PeekableChars},
        std::{collections::HashMap, path::Path},
    };

    #[test]
    fn kconfig_comments_blank_lines() {
        let kconfig = KConfig::parse_str_raw(
            PeekableChars::new(
                r##"mainmenu "Hello, world!"

    source "/tmp/myfile"

    # Read the next file
    source "/tmp/myfile2"
"##,
                Path::new("test"),
            ),
            Path::new("/tmp"),
        )
        .unwrap();

        assert_eq!(kconfig.blocks.len(), 3);
    }

    #[test]
    fn kconfig_mainmenu_expansion() {
        let mut context = HashMap::new();
        context.insert("PROJECT".to_string(), "Blinky".to_string());

        let kconfig = KConfig::parse_str(
            PeekableChars::new(
                r##"mainmenu "$PROJECT configuration"

config FOO
    bool "foo"
"##,
                Path::new("test"),
            ),
            Path::new("/tmp"),
            &context,
        )
        .unwrap();

        let Block::Mainmenu(title) = &kconfig.blocks[0] else {
            panic!("Expected mainmenu");
        };
        assert_eq!(title.as_str(), "Blinky configuration");

        let e = KConfig::parse_str(
            PeekableChars::new(r##"mainmenu "$MISSING configuration""##, Path::new("test")),
            Path::new("/tmp"),
            &context,
        )
        .unwrap_err();
        assert!(e.to_string().contains("MISSING"), "{e}");
    }

    #[test]
    fn kconfig_menuconfig() {
        let kconfig = KConfig::parse_str_raw(
            PeekableChars::new(
                r##"
    menuconfig FOO
        bool "Foo"
        default y
        help
          Say foo
"##,
                Path::new("test"),
            ),
            Path::new("/tmp"),
        )
        .unwrap();

        assert_eq!(kconfig.blocks.len(), 1);
        let Block::MenuConfig(c) = &kconfig.blocks[0] else {
            panic!("Expected MenuConfig");
        };

        assert_eq!(c.name.as_str(), "FOO");
        assert_eq!(c.prompts.len(), 1);
        assert_eq!(c.help.as_ref().unwrap().as_str(), "Say foo\n");
    }

    #[test]
    fn kconfig_nested_menus() {
        let kconfig = KConfig::parse_str_raw(
            PeekableChars::new(
                r##"menu "Outer"
    depends on A

    config B
        bool "b"

    menu "Inner"
        visible if C

        config D
            tristate "d"
    endmenu
endmenu
"##,
                Path::new("test"),
            ),
            Path::new("/tmp"),
        )
        .unwrap();

        assert_eq!(kconfig.blocks.len(), 1);
        let Block::Menu(outer) = &kconfig.blocks[0] else {
            panic!("Expected Menu");
        };

        assert_eq!(outer.title.as_str(), "Outer");
        assert_eq!(outer.depends_on.len(), 1);
        assert_eq!(outer.blocks.len(), 2);

        let Block::Menu(inner) = &outer.blocks[1] else {
            panic!("Expected inner Menu");
        };
        assert_eq!(inner.title.as_str(), "Inner");
        assert_eq!(inner.visibility.len(), 1);
    }

    #[test]
    fn kconfig_choice_block() {
        let kconfig = KConfig::parse_str_raw(
            PeekableChars::new(
                r##"choice PICK
    bool "Pick one"
    optional
    default B if C

    config A
        bool "a"

    config B
        bool "b"
endchoice
"##,
                Path::new("test"),
            ),
            Path::new("/tmp"),
        )
        .unwrap();

        assert_eq!(kconfig.blocks.len(), 1);
        let Block::Choice(choice) = &kconfig.blocks[0] else {
            panic!("Expected Choice");
        };

        assert_eq!(choice.name.as_ref().unwrap().as_str(), "PICK");
        assert!(choice.optional);
        assert_eq!(choice.configs.len(), 2);
        assert_eq!(choice.defaults.len(), 1);
        assert_eq!(choice.defaults[0].target.as_str(), "B");
        assert!(choice.defaults[0].condition.is_some());
    }

    #[test]
    fn kconfig_unmatched_terminators() {
        for input in ["endif\n", "endmenu\n", "endchoice\n"] {
            let e = KConfig::parse_str_raw(PeekableChars::new(input, Path::new("test")), Path::new("/tmp"))
                .unwrap_err();
            assert!(e.to_string().contains("without matching"), "{input}: {e}");
        }
    }

    #[test]
    fn kconfig_conflicting_types() {
        let e = KConfig::parse_str_raw(
            PeekableChars::new(
                r##"config FOO
    bool "foo"
    int
"##,
                Path::new("test"),
            ),
            Path::new("/tmp"),
        )
        .unwrap_err();

        assert!(e.to_string().contains("conflicting type"), "{e}");
    }
}

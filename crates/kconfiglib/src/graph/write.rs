use {
    super::{ChoiceId, ChoiceNode, Symbol, SymbolGraph},
    crate::parser::{write_str_lit, Expr, Type},
    std::{
        collections::BTreeSet,
        fmt::{Result as FmtResult, Write},
    },
};

impl SymbolGraph {
    /// Render the graph back to Kconfig text.
    ///
    /// The output is flat: every defined symbol carries its effective depends-on condition as
    /// an explicit `depends on` line, choice members stay grouped inside their choice, and
    /// menus are emitted as empty shells. Reparsing the output yields a graph with the same
    /// symbol names, types, and effective dependency expressions.
    pub fn to_kconfig(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_kconfig(&mut out);
        out
    }

    /// Write the graph as Kconfig text to `w`. See [`to_kconfig`](Self::to_kconfig).
    pub fn write_kconfig<W: Write>(&self, w: &mut W) -> FmtResult {
        let mut first = true;

        if let Some(title) = &self.mainmenu {
            write_block_sep(w, &mut first)?;
            write!(w, "mainmenu ")?;
            write_str_lit(w, title)?;
            writeln!(w)?;
        }

        let mut written_choices: BTreeSet<ChoiceId> = BTreeSet::new();

        for &id in &self.order {
            let symbol = &self.symbols[id];
            if !symbol.defined {
                continue;
            }

            match symbol.choice {
                Some(cid) => {
                    if written_choices.insert(cid) {
                        write_block_sep(w, &mut first)?;
                        self.write_choice(w, cid)?;
                    }
                }
                None => {
                    write_block_sep(w, &mut first)?;
                    self.write_symbol(w, symbol)?;
                }
            }
        }

        for &mid in &self.menu_order {
            let menu = &self.menus[mid];
            write_block_sep(w, &mut first)?;

            write!(w, "menu ")?;
            write_str_lit(w, &menu.title)?;
            writeln!(w)?;

            if let Some(cond) = Expr::conjoin(menu.depends_on.iter().chain(&menu.enclosing).cloned()) {
                writeln!(w, "\tdepends on {cond}")?;
            }

            for cond in &menu.visible_if {
                writeln!(w, "\tvisible if {cond}")?;
            }

            writeln!(w, "endmenu")?;
        }

        for &cmid in &self.comment_order {
            let comment = &self.comments[cmid];
            write_block_sep(w, &mut first)?;

            write!(w, "comment ")?;
            write_str_lit(w, &comment.text)?;
            writeln!(w)?;

            if let Some(cond) = Expr::conjoin(comment.depends_on.iter().chain(&comment.enclosing).cloned()) {
                writeln!(w, "\tdepends on {cond}")?;
            }
        }

        Ok(())
    }

    fn write_symbol<W: Write>(&self, w: &mut W, symbol: &Symbol) -> FmtResult {
        let keyword = if symbol.menuconfig { "menuconfig" } else { "config" };
        writeln!(w, "{keyword} {}", symbol.name)?;
        self.write_symbol_body(w, symbol)
    }

    fn write_symbol_body<W: Write>(&self, w: &mut W, symbol: &Symbol) -> FmtResult {
        if symbol.r#type != Type::Unknown {
            writeln!(w, "\t{}", symbol.r#type)?;
        }

        for prompt in &symbol.prompts {
            write!(w, "\tprompt ")?;
            write_str_lit(w, &prompt.text)?;
            write_condition(w, prompt.condition.as_ref())?;
            writeln!(w)?;
        }

        for default in &symbol.defaults {
            write!(w, "\tdefault {}", default.value)?;
            write_condition(w, default.condition.as_ref())?;
            writeln!(w)?;
        }

        for range in &symbol.ranges {
            write!(w, "\trange {} {}", range.start, range.end)?;
            write_condition(w, range.condition.as_ref())?;
            writeln!(w)?;
        }

        for (keyword, targets) in [("select", &symbol.selects), ("imply", &symbol.implies)] {
            for target in targets {
                write!(w, "\t{keyword} {}", self.symbols[target.target].name)?;
                write_condition(w, target.condition.as_ref())?;
                writeln!(w)?;
            }
        }

        if let Some(env) = &symbol.env {
            write!(w, "\toption env=")?;
            write_str_lit(w, env)?;
            writeln!(w)?;
        }

        if symbol.defconfig_list {
            writeln!(w, "\toption defconfig_list")?;
        }

        if symbol.modules {
            writeln!(w, "\toption modules")?;
        }

        if symbol.allnoconfig_y {
            writeln!(w, "\toption allnoconfig_y")?;
        }

        if let Some(cond) = symbol.effective_depends_on() {
            writeln!(w, "\tdepends on {cond}")?;
        }

        if let Some(help) = &symbol.help {
            write_help(w, help)?;
        }

        Ok(())
    }

    fn write_choice<W: Write>(&self, w: &mut W, cid: ChoiceId) -> FmtResult {
        let choice: &ChoiceNode = &self.choices[cid];

        match &choice.name {
            Some(name) => writeln!(w, "choice {name}")?,
            None => writeln!(w, "choice")?,
        }

        if choice.r#type != Type::Unknown {
            writeln!(w, "\t{}", choice.r#type)?;
        }

        if let Some(prompt) = &choice.prompt {
            write!(w, "\tprompt ")?;
            write_str_lit(w, &prompt.text)?;
            write_condition(w, prompt.condition.as_ref())?;
            writeln!(w)?;
        }

        if choice.optional {
            writeln!(w, "\toptional")?;
        }

        for default in &choice.defaults {
            write!(w, "\tdefault {}", self.symbols[default.target].name)?;
            write_condition(w, default.condition.as_ref())?;
            writeln!(w)?;
        }

        if let Some(cond) = Expr::conjoin(choice.depends_on.iter().chain(&choice.enclosing).cloned()) {
            writeln!(w, "\tdepends on {cond}")?;
        }

        if let Some(help) = &choice.help {
            write_help(w, help)?;
        }

        for &member in &choice.members {
            // Members are always plain config entries, whatever other definitions merged in.
            writeln!(w)?;
            writeln!(w, "config {}", self.symbols[member].name)?;
            self.write_symbol_body(w, &self.symbols[member])?;
        }

        writeln!(w, "endchoice")?;
        Ok(())
    }
}

/// Write a blank line between top-level blocks.
fn write_block_sep<W: Write>(w: &mut W, first: &mut bool) -> FmtResult {
    if *first {
        *first = false;
        Ok(())
    } else {
        writeln!(w)
    }
}

fn write_condition<W: Write>(w: &mut W, condition: Option<&Expr>) -> FmtResult {
    match condition {
        Some(cond) => write!(w, " if {cond}"),
        None => Ok(()),
    }
}

/// Write a help block with the text indented past the `help` keyword.
fn write_help<W: Write>(w: &mut W, help: &str) -> FmtResult {
    writeln!(w, "\thelp")?;

    for line in help.lines() {
        if line.is_empty() {
            writeln!(w)?;
        } else {
            writeln!(w, "\t  {line}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            parser::{KConfig, PeekableChars},
            SymbolGraph,
        },
        std::path::Path,
    };

    fn render(input: &str) -> String {
        let kconfig =
            KConfig::parse_str(PeekableChars::new(input, Path::new("write-test")), Path::new("/tmp"), &()).unwrap();
        SymbolGraph::build(&kconfig).unwrap().to_kconfig()
    }

    #[test]
    fn symbols_render_with_merged_dependencies() {
        let text = render(
            "menuconfig GATE\n\tbool \"gate\"\n\nif GATE\n\nconfig PAL\n\tstring \"pal\"\n\tdefault \
             \"vga\"\n\nendif\n",
        );

        assert!(text.contains("menuconfig GATE\n"), "{text}");
        assert!(text.contains("config PAL\n"), "{text}");
        assert!(text.contains("\tdefault \"vga\"\n"), "{text}");
        assert!(text.contains("\tdepends on GATE\n"), "{text}");
    }

    #[test]
    fn choice_members_stay_grouped() {
        let text =
            render("choice PICK\n\tbool \"pick\"\n\nconfig A\n\tbool \"a\"\n\nconfig B\n\tbool \"b\"\n\nendchoice\n");

        let choice = text.find("choice PICK").unwrap();
        let a = text.find("config A").unwrap();
        let b = text.find("config B").unwrap();
        let end = text.find("endchoice").unwrap();
        assert!(choice < a && a < b && b < end, "{text}");
    }

    #[test]
    fn output_reparses() {
        let text = render(
            "mainmenu \"Round trip\"\n\nconfig KEEP\n\ttristate \"keep\"\n\tselect OTHER if FLAG\n\thelp\n\t  \
             Retained help text.\n\nconfig SIZE\n\tint \"size\"\n\trange 1 10\n\nconfig OTHER\n\tbool \
             \"other\"\n\nconfig FLAG\n\tbool \"flag\"\n",
        );

        let reparsed = render(&text);
        assert_eq!(text, reparsed);
    }
}

use {
    super::{
        ChoiceId, ChoiceNode, CommentId, CommentNode, Item, MenuId, MenuNode, ReverseDep, Symbol, SymbolDefault,
        SymbolGraph, SymbolId, SymbolPrompt, SymbolRange, SymbolTarget,
    },
    crate::parser::{
        Block, Choice, Comment, Config, ConfigTarget, Expr, KConfig, KConfigError, LitValue, LocExpr, Located,
        Location, Menu, Type,
    },
    slotmap::SecondaryMap,
    std::collections::BTreeSet,
};

impl SymbolGraph {
    /// Build the symbol graph for a parsed hierarchy.
    ///
    /// All `source` directives must have been evaluated already; an unresolved [`Block::Source`]
    /// is a parse error. Fails with a cyclic-dependency error if any symbol's accumulated
    /// condition transitively references itself through `depends on`, `select`, or `imply`
    /// chains.
    pub fn build(kconfig: &KConfig) -> Result<Self, KConfigError> {
        let mut builder = Builder::default();
        let items = builder.walk_blocks(&kconfig.blocks)?;
        builder.graph.items = items;
        builder.finalize()?;
        Ok(builder.graph)
    }
}

/// Walks the block tree with a stack of enclosing dependency conditions.
#[derive(Default)]
struct Builder {
    graph: SymbolGraph,

    /// Conditions of the enclosing `if` blocks and dependent menus, innermost last.
    scope: Vec<Expr>,
}

impl Builder {
    fn walk_blocks(&mut self, blocks: &[Block]) -> Result<Vec<Item>, KConfigError> {
        let mut items = Vec::new();

        for block in blocks {
            match block {
                Block::Config(config) => items.push(Item::Symbol(self.add_config(config, false)?)),
                Block::MenuConfig(config) => items.push(Item::Symbol(self.add_config(config, true)?)),
                Block::Choice(choice) => items.push(Item::Choice(self.add_choice(choice)?)),
                Block::Comment(comment) => items.push(Item::Comment(self.add_comment(comment))),
                Block::Menu(menu) => items.push(Item::Menu(self.add_menu(menu)?)),

                Block::If(ifblock) => {
                    // An if block is not a display node; its items belong to the parent.
                    self.scope.push(ifblock.condition.expr.clone());
                    let nested = self.walk_blocks(&ifblock.items);
                    self.scope.pop();
                    items.extend(nested?);
                }

                Block::Mainmenu(title) => {
                    if self.graph.mainmenu.is_none() {
                        self.graph.mainmenu = Some(title.as_str().to_string());
                    } else {
                        log::debug!("ignoring duplicate mainmenu at {}", title.location());
                    }
                }

                Block::Source(source) => {
                    return Err(KConfigError::parse("unresolved source directive", source.location()));
                }
            }
        }

        Ok(items)
    }

    /// The conjunction of the current scope stack.
    fn enclosing_cond(&self) -> Option<Expr> {
        Expr::conjoin(self.scope.iter().cloned())
    }

    /// The condition for a property: the enclosing scope conjoined with the property's own
    /// `if` condition.
    fn propagate(&self, own: Option<&LocExpr>) -> Option<Expr> {
        Expr::conjoin(self.scope.iter().cloned().chain(own.map(|e| e.expr.clone())))
    }

    /// Get or create the symbol with the given name.
    fn intern(&mut self, name: &str, location: Location) -> SymbolId {
        if let Some(&id) = self.graph.by_name.get(name) {
            return id;
        }

        let id = self.graph.symbols.insert(Symbol {
            name: name.to_string(),
            r#type: Type::Unknown,
            menuconfig: false,
            defined: false,
            prompts: Vec::new(),
            defaults: Vec::new(),
            selects: Vec::new(),
            implies: Vec::new(),
            ranges: Vec::new(),
            depends_on: Vec::new(),
            enclosing: Vec::new(),
            help: None,
            env: None,
            allnoconfig_y: false,
            defconfig_list: false,
            modules: false,
            choice: None,
            location,
        });

        self.graph.by_name.insert(name.to_string(), id);
        self.graph.order.push(id);
        id
    }

    /// Merge a `config` or `menuconfig` block into its symbol.
    fn add_config(&mut self, config: &Config, menuconfig: bool) -> Result<SymbolId, KConfigError> {
        let id = self.intern(config.name.as_str(), config.name.location());
        let enclosing = self.enclosing_cond();

        let prompts: Vec<SymbolPrompt> = config
            .prompts
            .iter()
            .map(|p| {
                SymbolPrompt {
                    text: p.title.as_str().to_string(),
                    condition: self.propagate(p.condition.as_ref()),
                }
            })
            .collect();

        let defaults: Vec<SymbolDefault> = config
            .defaults
            .iter()
            .map(|d| {
                SymbolDefault {
                    value: d.value.expr.clone(),
                    condition: self.propagate(d.condition.as_ref()),
                }
            })
            .collect();

        let ranges: Vec<SymbolRange> = config
            .ranges
            .iter()
            .map(|r| {
                SymbolRange {
                    start: r.start.value.clone(),
                    end: r.end.value.clone(),
                    condition: self.propagate(r.condition.as_ref()),
                }
            })
            .collect();

        let selects = self.add_relations(id, &config.selects, RelationKind::Select);
        let implies = self.add_relations(id, &config.implies, RelationKind::Imply);

        let symbol = &mut self.graph.symbols[id];

        if config.r#type != Type::Unknown {
            if symbol.r#type == Type::Unknown {
                symbol.r#type = config.r#type;
            } else if symbol.r#type != config.r#type {
                return Err(KConfigError::parse(
                    format!(
                        "symbol {} redefined with conflicting type {} (was {})",
                        symbol.name, config.r#type, symbol.r#type
                    ),
                    config.location(),
                ));
            }
        }

        if !symbol.defined {
            symbol.location = config.name.location();
        }

        symbol.defined = true;
        symbol.menuconfig |= menuconfig;
        symbol.prompts.extend(prompts);
        symbol.defaults.extend(defaults);
        symbol.selects.extend(selects);
        symbol.implies.extend(implies);
        symbol.ranges.extend(ranges);
        symbol.depends_on.extend(config.depends_on.iter().map(|d| d.expr.clone()));

        if let Some(cond) = enclosing {
            symbol.enclosing.push(cond);
        }

        if symbol.help.is_none() {
            symbol.help = config.help.as_ref().map(|h| h.as_str().to_string());
        }

        if symbol.env.is_none() {
            symbol.env = config.env.as_ref().map(|e| e.as_str().to_string());
        }

        symbol.allnoconfig_y |= config.allnoconfig_y;
        symbol.defconfig_list |= config.defconfig_list;
        symbol.modules |= config.modules;

        Ok(id)
    }

    /// Intern `select`/`imply` targets and record the reverse edges on them.
    fn add_relations(&mut self, source: SymbolId, relations: &[ConfigTarget], kind: RelationKind) -> Vec<SymbolTarget> {
        let mut targets = Vec::with_capacity(relations.len());

        for relation in relations {
            let target = self.intern(relation.target_name.as_str(), relation.target_name.location());
            let condition = self.propagate(relation.condition.as_ref());

            targets.push(SymbolTarget {
                target,
                condition: condition.clone(),
            });

            let edge = ReverseDep {
                source,
                condition,
            };

            let map = match kind {
                RelationKind::Select => &mut self.graph.selected_by,
                RelationKind::Imply => &mut self.graph.implied_by,
            };

            match map.get_mut(target) {
                Some(edges) => edges.push(edge),
                None => {
                    map.insert(target, vec![edge]);
                }
            }
        }

        targets
    }

    fn add_choice(&mut self, choice: &Choice) -> Result<ChoiceId, KConfigError> {
        let enclosing = self.enclosing_cond();
        let name = choice.name.as_ref().map(|n| n.as_str().to_string());

        let prompt = choice.prompt.as_ref().map(|p| {
            SymbolPrompt {
                text: p.title.as_str().to_string(),
                condition: self.propagate(p.condition.as_ref()),
            }
        });

        let node = ChoiceNode {
            name: name.clone(),
            r#type: choice.r#type,
            prompt,
            defaults: Vec::new(),
            members: Vec::new(),
            depends_on: choice.depends_on.iter().map(|d| d.expr.clone()).collect(),
            enclosing: enclosing.into_iter().collect(),
            optional: choice.optional,
            help: choice.help.as_ref().map(|h| h.as_str().to_string()),
            location: choice.location(),
        };

        let cid = self.graph.choices.insert(node);
        self.graph.choice_order.push(cid);

        if let Some(name) = name {
            self.graph.choices_by_name.insert(name, cid);
        }

        // The choice's own condition scopes member visibility only, so it is not pushed as a
        // dependency frame. Membership edges are added when the graph is finalized.
        for config in &choice.configs {
            let member = self.add_config(config, false)?;
            self.graph.symbols[member].choice = Some(cid);
            self.graph.choices[cid].members.push(member);
        }

        for comment in &choice.comments {
            self.add_comment(comment);
        }

        let mut defaults = Vec::with_capacity(choice.defaults.len());
        for d in &choice.defaults {
            let target = self.intern(d.target.as_str(), d.target.location());
            defaults.push(SymbolTarget {
                target,
                condition: self.propagate(d.condition.as_ref()),
            });
        }
        self.graph.choices[cid].defaults = defaults;

        Ok(cid)
    }

    fn add_menu(&mut self, menu: &Menu) -> Result<MenuId, KConfigError> {
        let enclosing = self.enclosing_cond();
        let depends_on: Vec<Expr> = menu.depends_on.iter().map(|d| d.expr.clone()).collect();

        // The menu's depends-on conditions scope the contained items; visible-if does not.
        let pushed = depends_on.len();
        self.scope.extend(depends_on.iter().cloned());
        let items = self.walk_blocks(&menu.blocks);
        self.scope.truncate(self.scope.len() - pushed);

        let node = MenuNode {
            title: menu.title.as_str().to_string(),
            depends_on,
            visible_if: menu.visibility.iter().map(|v| v.expr.clone()).collect(),
            enclosing: enclosing.into_iter().collect(),
            items: items?,
            location: menu.location(),
        };

        let id = self.graph.menus.insert(node);
        self.graph.menu_order.push(id);
        Ok(id)
    }

    fn add_comment(&mut self, comment: &Comment) -> CommentId {
        let node = CommentNode {
            text: comment.text.as_str().to_string(),
            depends_on: comment.depends_on.iter().map(|d| d.expr.clone()).collect(),
            enclosing: self.enclosing_cond().into_iter().collect(),
            location: comment.location(),
        };

        let id = self.graph.comments.insert(node);
        self.graph.comment_order.push(id);
        id
    }

    fn finalize(&mut self) -> Result<(), KConfigError> {
        self.intern_references();
        self.infer_choice_types();
        self.collect_edges();
        self.detect_cycles()
    }

    /// Create undefined placeholder symbols for every name mentioned in an expression but
    /// never defined.
    fn intern_references(&mut self) {
        let mut found: Vec<(String, Location)> = Vec::new();

        for &id in &self.graph.order {
            let symbol = &self.graph.symbols[id];
            let location = symbol.location;
            let mut push = |name: &str| found.push((name.to_string(), location));

            for e in &symbol.depends_on {
                e.for_each_symbol(&mut push);
            }

            for e in &symbol.enclosing {
                e.for_each_symbol(&mut push);
            }

            for p in &symbol.prompts {
                if let Some(c) = &p.condition {
                    c.for_each_symbol(&mut push);
                }
            }

            for d in &symbol.defaults {
                d.value.for_each_symbol(&mut push);
                if let Some(c) = &d.condition {
                    c.for_each_symbol(&mut push);
                }
            }

            for r in &symbol.ranges {
                for bound in [&r.start, &r.end] {
                    if let LitValue::Symbol(name) = bound {
                        push(name);
                    }
                }

                if let Some(c) = &r.condition {
                    c.for_each_symbol(&mut push);
                }
            }

            for t in symbol.selects.iter().chain(&symbol.implies) {
                if let Some(c) = &t.condition {
                    c.for_each_symbol(&mut push);
                }
            }
        }

        for &cid in &self.graph.choice_order {
            let choice = &self.graph.choices[cid];
            let location = choice.location;
            let mut push = |name: &str| found.push((name.to_string(), location));

            for e in choice.depends_on.iter().chain(&choice.enclosing) {
                e.for_each_symbol(&mut push);
            }

            if let Some(c) = choice.prompt.as_ref().and_then(|p| p.condition.as_ref()) {
                c.for_each_symbol(&mut push);
            }

            for d in &choice.defaults {
                if let Some(c) = &d.condition {
                    c.for_each_symbol(&mut push);
                }
            }
        }

        for (name, location) in found {
            self.intern(&name, location);
        }
    }

    /// Give untyped choices the type of their first typed member and untyped members the type
    /// of their choice.
    fn infer_choice_types(&mut self) {
        let choice_ids: Vec<ChoiceId> = self.graph.choice_order.clone();

        for cid in choice_ids {
            let mut ctype = self.graph.choices[cid].r#type;

            if ctype == Type::Unknown {
                ctype = self
                    .graph
                    .choices[cid]
                    .members
                    .iter()
                    .map(|&m| self.graph.symbols[m].r#type)
                    .find(|&t| t != Type::Unknown)
                    .unwrap_or(Type::Bool);
                self.graph.choices[cid].r#type = ctype;
            }

            let members = self.graph.choices[cid].members.clone();
            for member in members {
                let symbol = &mut self.graph.symbols[member];
                if symbol.r#type == Type::Unknown {
                    symbol.r#type = ctype;
                }
            }
        }
    }

    /// Build the forward and reverse dependency edge maps.
    fn collect_edges(&mut self) {
        let mut deps: SecondaryMap<SymbolId, BTreeSet<SymbolId>> = SecondaryMap::new();

        {
            let graph = &self.graph;

            for &id in &graph.order {
                let symbol = &graph.symbols[id];

                for e in &symbol.depends_on {
                    expr_edges(graph, &mut deps, id, e);
                }

                if symbol.has_prompt() {
                    for e in &symbol.enclosing {
                        expr_edges(graph, &mut deps, id, e);
                    }

                    for p in &symbol.prompts {
                        if let Some(c) = &p.condition {
                            expr_edges(graph, &mut deps, id, c);
                        }
                    }
                }

                for d in &symbol.defaults {
                    expr_edges(graph, &mut deps, id, &d.value);
                    if let Some(c) = &d.condition {
                        expr_edges(graph, &mut deps, id, c);
                    }
                }

                for r in &symbol.ranges {
                    for bound in [&r.start, &r.end] {
                        if let LitValue::Symbol(name) = bound {
                            if let Some(&to) = graph.by_name.get(name.as_str()) {
                                add_edge(&mut deps, id, to);
                            }
                        }
                    }

                    if let Some(c) = &r.condition {
                        expr_edges(graph, &mut deps, id, c);
                    }
                }

                for edge in reverse_edges(graph, id) {
                    add_edge(&mut deps, id, edge.source);
                    if let Some(c) = &edge.condition {
                        expr_edges(graph, &mut deps, id, c);
                    }
                }
            }

            // Choice membership ties each member to its siblings and to the choice's own
            // conditions.
            for &cid in &graph.choice_order {
                let choice = &graph.choices[cid];

                for &member in &choice.members {
                    for &sibling in &choice.members {
                        add_edge(&mut deps, member, sibling);
                    }

                    for e in choice.depends_on.iter().chain(&choice.enclosing) {
                        expr_edges(graph, &mut deps, member, e);
                    }
                }
            }
        }

        let mut rdeps: SecondaryMap<SymbolId, BTreeSet<SymbolId>> = SecondaryMap::new();
        for (from, targets) in &deps {
            for &to in targets {
                add_edge(&mut rdeps, to, from);
            }
        }

        self.graph.deps = deps;
        self.graph.rdeps = rdeps;
    }

    /// Reject dependency cycles through `depends on`, enclosing scopes, `select`, and `imply`.
    ///
    /// Default-value chains are deliberately not walked here; a cycle that only passes through
    /// defaults is caught during evaluation.
    fn detect_cycles(&self) -> Result<(), KConfigError> {
        let graph = &self.graph;
        let mut hard: SecondaryMap<SymbolId, BTreeSet<SymbolId>> = SecondaryMap::new();

        for &id in &graph.order {
            let symbol = &graph.symbols[id];

            for e in &symbol.depends_on {
                expr_edges(graph, &mut hard, id, e);
            }

            if symbol.has_prompt() {
                for e in &symbol.enclosing {
                    expr_edges(graph, &mut hard, id, e);
                }
            }

            for edge in reverse_edges(graph, id) {
                add_edge(&mut hard, id, edge.source);
                if let Some(c) = &edge.condition {
                    expr_edges(graph, &mut hard, id, c);
                }
            }
        }

        #[derive(Clone, Copy, Eq, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        fn visit(
            graph: &SymbolGraph,
            hard: &SecondaryMap<SymbolId, BTreeSet<SymbolId>>,
            marks: &mut SecondaryMap<SymbolId, Mark>,
            id: SymbolId,
        ) -> Result<(), KConfigError> {
            match marks.get(id).copied().unwrap_or(Mark::White) {
                Mark::Black => return Ok(()),
                Mark::Gray => {
                    let symbol = &graph.symbols[id];
                    return Err(KConfigError::cycle(&symbol.name, Some(symbol.location)));
                }
                Mark::White => {}
            }

            marks.insert(id, Mark::Gray);

            if let Some(targets) = hard.get(id) {
                for &target in targets {
                    visit(graph, hard, marks, target)?;
                }
            }

            marks.insert(id, Mark::Black);
            Ok(())
        }

        let mut marks: SecondaryMap<SymbolId, Mark> = SecondaryMap::new();
        for &id in &graph.order {
            visit(graph, &hard, &mut marks, id)?;
        }

        Ok(())
    }
}

#[derive(Clone, Copy)]
enum RelationKind {
    Select,
    Imply,
}

fn add_edge(deps: &mut SecondaryMap<SymbolId, BTreeSet<SymbolId>>, from: SymbolId, to: SymbolId) {
    if from == to {
        return;
    }

    match deps.get_mut(from) {
        Some(set) => {
            set.insert(to);
        }
        None => {
            deps.insert(from, BTreeSet::from([to]));
        }
    }
}

/// Add an edge from `from` to every symbol `expr` mentions.
fn expr_edges(graph: &SymbolGraph, deps: &mut SecondaryMap<SymbolId, BTreeSet<SymbolId>>, from: SymbolId, expr: &Expr) {
    expr.for_each_symbol(&mut |name| {
        if let Some(&to) = graph.by_name.get(name) {
            add_edge(deps, from, to);
        }
    });
}

/// The `select` and `imply` edges pointing at `id`.
fn reverse_edges<'a>(graph: &'a SymbolGraph, id: SymbolId) -> impl Iterator<Item = &'a ReverseDep> {
    graph.selected_by.get(id).into_iter().flatten().chain(graph.implied_by.get(id).into_iter().flatten())
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            parser::{KConfig, KConfigError, KConfigErrorKind, PeekableChars, Type},
            Resolved, SymbolGraph,
        },
        std::{collections::BTreeSet, path::Path},
    };

    fn build(input: &str) -> Result<SymbolGraph, KConfigError> {
        let kconfig =
            KConfig::parse_str(PeekableChars::new(input, Path::new("build-test")), Path::new("/tmp"), &()).unwrap();
        SymbolGraph::build(&kconfig)
    }

    fn graph(input: &str) -> SymbolGraph {
        build(input).unwrap()
    }

    #[test]
    fn select_and_imply_record_reverse_deps() {
        let graph = graph(
            "config A\n\tbool \"a\"\n\tselect B\n\timply C if D\n\nconfig B\n\tbool \"b\"\n\nconfig C\n\ttristate \
             \"c\"\n\nconfig D\n\tbool \"d\"\n",
        );

        let selected = graph.selected_by("B");
        assert_eq!(selected.len(), 1);
        assert_eq!(graph.symbol(selected[0].source).unwrap().name, "A");
        assert!(selected[0].condition.is_none());

        let implied = graph.implied_by("C");
        assert_eq!(implied.len(), 1);
        assert!(implied[0].condition.as_ref().unwrap().references("D"));

        assert_eq!(graph.reverse_dependencies("B").unwrap().to_string(), "A");
        assert_eq!(graph.weak_reverse_dependencies("C").unwrap().to_string(), "A && D");
        assert!(graph.reverse_dependencies("C").is_none());
    }

    #[test]
    fn depends_cycles_are_rejected() {
        let e = build("config X\n\tbool \"x\"\n\tdepends on Y\n\nconfig Y\n\tbool \"y\"\n\tdepends on X\n")
            .unwrap_err();
        assert!(matches!(e.kind, KConfigErrorKind::CyclicDependency(_)), "{e}");

        let e = build("config P\n\tbool \"p\"\n\tselect Q\n\nconfig Q\n\tbool \"q\"\n\tselect P\n").unwrap_err();
        assert!(matches!(e.kind, KConfigErrorKind::CyclicDependency(_)), "{e}");
    }

    #[test]
    fn default_only_cycles_build() {
        // A cycle that only passes through default values is legal here; it fails if actually
        // evaluated.
        let graph = graph("config A\n\tbool \"a\"\n\tdefault B\n\nconfig B\n\tbool \"b\"\n\tdefault A\n");
        assert!(graph.lookup("A").is_some());
    }

    #[test]
    fn conflicting_types_across_definitions() {
        let e = build("config T\n\tbool \"t\"\n\nconfig T\n\tint \"t again\"\n").unwrap_err();
        let KConfigErrorKind::Parse(msg) = &e.kind else {
            panic!("unexpected error: {e}");
        };
        assert!(msg.contains("conflicting type"), "{msg}");
    }

    #[test]
    fn visible_if_stays_on_the_menu() {
        let graph = graph(
            "menu \"display\"\n\tvisible if GATE\n\nconfig INSIDE\n\tbool \"inside\"\n\nendmenu\n\nconfig \
             GATE\n\tbool \"gate\"\n",
        );

        assert!(graph.effective_depends_on("INSIDE").is_none());
        assert!(graph.dependents("GATE").is_empty());

        let menu = graph.menus().next().unwrap();
        assert_eq!(menu.visible_if.len(), 1);
        assert!(menu.visible_if[0].references("GATE"));
    }

    #[test]
    fn menu_depends_scope_prompted_symbols_only() {
        let graph = graph(
            "config GATE\n\tbool \"gate\"\n\nif GATE\n\nconfig PROMPTED\n\tbool \"prompted\"\n\nconfig \
             SILENT\n\tbool\n\nendif\n",
        );

        assert!(graph.effective_depends_on("PROMPTED").unwrap().references("GATE"));
        assert!(graph.effective_depends_on("SILENT").is_none());
        assert_eq!(graph.dependents("GATE"), BTreeSet::from(["PROMPTED"]));
    }

    #[test]
    fn choice_types_are_inferred() {
        let graph = graph(
            "choice\n\tprompt \"pick\"\n\nconfig M1\n\tprompt \"m1\"\n\nconfig M2\n\tprompt \
             \"m2\"\n\nendchoice\n\nchoice\n\nconfig M3\n\ttristate \"m3\"\n\nconfig M4\n\tprompt \
             \"m4\"\n\nendchoice\n",
        );

        let choices: Vec<_> = graph.choices().collect();
        assert_eq!(choices[0].r#type, Type::Bool);
        assert_eq!(choices[1].r#type, Type::Tristate);
        assert_eq!(graph.symbol(graph.lookup("M1").unwrap()).unwrap().r#type, Type::Bool);
        assert_eq!(graph.symbol(graph.lookup("M4").unwrap()).unwrap().r#type, Type::Tristate);
    }

    #[test]
    fn first_mainmenu_wins() {
        let graph = graph("mainmenu \"First\"\nmainmenu \"Second\"\n\nconfig A\n\tbool \"a\"\n");
        assert_eq!(graph.mainmenu(), Some("First"));
    }

    #[test]
    fn unresolved_sources_are_rejected() {
        let kconfig =
            KConfig::parse_str_raw(PeekableChars::new("source \"other\"\n", Path::new("t")), Path::new("/tmp"))
                .unwrap();
        let e = SymbolGraph::build(&kconfig).unwrap_err();
        let KConfigErrorKind::Parse(msg) = &e.kind else {
            panic!("unexpected error: {e}");
        };
        assert!(msg.contains("unresolved source"), "{msg}");
    }

    #[test]
    fn referenced_but_undefined_symbols_are_placeholders() {
        let graph = graph("config A\n\tbool \"a\"\n\tdepends on GHOST\n");

        let ghost = graph.symbol(graph.lookup("GHOST").unwrap()).unwrap();
        assert!(!ghost.defined);
        assert!(matches!(graph.resolve("GHOST"), Resolved::Symbol(_)));
        assert_eq!(graph.dependents("GHOST"), BTreeSet::from(["A"]));
    }
}

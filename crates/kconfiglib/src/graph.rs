//! Symbol graph built from a parsed Kconfig hierarchy.
//!
//! [`SymbolGraph::build`] walks a [`KConfig`](crate::parser::KConfig) tree once and produces an
//! immutable graph: a symbol table merging every definition of each name, choice/menu/comment
//! nodes, and dependency edges derived from `depends on`, `default`, `range`, `select`, and
//! `imply` properties together with the enclosing `if` and `menu` conditions. Queries never
//! mutate the graph; evaluation state lives in [`Assignment`](crate::Assignment).

use {
    crate::parser::{Expr, LitValue, Location, Type},
    slotmap::{new_key_type, SecondaryMap, SlotMap},
    std::collections::{BTreeSet, HashMap, VecDeque},
};

mod build;
mod write;

new_key_type! {
    /// Key for a [`Symbol`] in a [`SymbolGraph`].
    pub struct SymbolId;

    /// Key for a [`ChoiceNode`] in a [`SymbolGraph`].
    pub struct ChoiceId;

    /// Key for a [`MenuNode`] in a [`SymbolGraph`].
    pub struct MenuId;

    /// Key for a [`CommentNode`] in a [`SymbolGraph`].
    pub struct CommentId;
}

/// A configuration symbol with every property from every definition of its name merged in.
#[derive(Clone, Debug)]
pub struct Symbol {
    /// The name of the symbol.
    pub name: String,

    /// The type of the symbol. The first definition that declares a type wins; later
    /// definitions must agree.
    pub r#type: Type,

    /// Whether any definition used `menuconfig` rather than `config`.
    pub menuconfig: bool,

    /// Whether the symbol was defined by a `config` block. Symbols that are only referenced
    /// from expressions are created as undefined placeholders.
    pub defined: bool,

    /// Prompts attached to the symbol, in declaration order.
    pub prompts: Vec<SymbolPrompt>,

    /// Defaults attached to the symbol, in declaration order.
    pub defaults: Vec<SymbolDefault>,

    /// Symbols selected by this symbol.
    pub selects: Vec<SymbolTarget>,

    /// Symbols implied by this symbol.
    pub implies: Vec<SymbolTarget>,

    /// Value ranges attached to the symbol.
    pub ranges: Vec<SymbolRange>,

    /// The symbol's own `depends on` conditions, from every definition.
    pub depends_on: Vec<Expr>,

    /// One entry per definition that occurred inside `if` blocks or dependent menus: the
    /// conjunction of the enclosing conditions at that definition site.
    pub enclosing: Vec<Expr>,

    /// Help text, from the first definition that provides it.
    pub help: Option<String>,

    /// Environment variable bound via `option env=`.
    pub env: Option<String>,

    /// Whether `option allnoconfig_y` was given.
    pub allnoconfig_y: bool,

    /// Whether `option defconfig_list` was given.
    pub defconfig_list: bool,

    /// Whether `option modules` was given.
    pub modules: bool,

    /// The choice this symbol is a member of, if any.
    pub choice: Option<ChoiceId>,

    /// The location of the first definition (or first reference for undefined symbols).
    pub location: Location,
}

/// A prompt attached to a symbol, with enclosing conditions folded into its own condition.
#[derive(Clone, Debug)]
pub struct SymbolPrompt {
    /// The prompt text.
    pub text: String,

    /// The condition under which the prompt is shown.
    pub condition: Option<Expr>,
}

/// A default value attached to a symbol.
#[derive(Clone, Debug)]
pub struct SymbolDefault {
    /// The default value expression.
    pub value: Expr,

    /// The condition under which the default applies.
    pub condition: Option<Expr>,
}

/// The target of a `select` or `imply`, or the target of a choice default.
#[derive(Clone, Debug)]
pub struct SymbolTarget {
    /// The target symbol.
    pub target: SymbolId,

    /// The condition under which the relation applies.
    pub condition: Option<Expr>,
}

/// A `range` restriction on an int or hex symbol.
#[derive(Clone, Debug)]
pub struct SymbolRange {
    /// The lower bound, either a literal or a symbol reference.
    pub start: LitValue,

    /// The upper bound, either a literal or a symbol reference.
    pub end: LitValue,

    /// The condition under which the range applies.
    pub condition: Option<Expr>,
}

/// A `select` or `imply` edge seen from the target symbol's side.
#[derive(Clone, Debug)]
pub struct ReverseDep {
    /// The symbol whose `select`/`imply` names the target.
    pub source: SymbolId,

    /// The condition on the `select`/`imply` statement.
    pub condition: Option<Expr>,
}

/// A choice group.
#[derive(Clone, Debug)]
pub struct ChoiceNode {
    /// The name of the choice, if it was given one.
    pub name: Option<String>,

    /// The type of the choice. Inferred from the members when not declared.
    pub r#type: Type,

    /// The prompt for the choice.
    pub prompt: Option<SymbolPrompt>,

    /// Defaults naming the member to pick.
    pub defaults: Vec<SymbolTarget>,

    /// The members of the choice, in declaration order.
    pub members: Vec<SymbolId>,

    /// The choice's own `depends on` conditions.
    pub depends_on: Vec<Expr>,

    /// The conjunction of enclosing conditions at the definition site, if any.
    pub enclosing: Vec<Expr>,

    /// Whether the choice was marked `optional`.
    pub optional: bool,

    /// Help text for the choice.
    pub help: Option<String>,

    /// The location of the `choice` keyword.
    pub location: Location,
}

/// A menu in the hierarchy.
#[derive(Clone, Debug)]
pub struct MenuNode {
    /// The title of the menu.
    pub title: String,

    /// The menu's own `depends on` conditions. These propagate to contained symbols.
    pub depends_on: Vec<Expr>,

    /// The menu's `visible if` conditions. These affect display only and do not propagate
    /// into contained symbols' dependencies.
    pub visible_if: Vec<Expr>,

    /// The conjunction of enclosing conditions at the definition site, if any.
    pub enclosing: Vec<Expr>,

    /// The items contained in the menu, in declaration order.
    pub items: Vec<Item>,

    /// The location of the `menu` keyword.
    pub location: Location,
}

/// A comment in the hierarchy.
#[derive(Clone, Debug)]
pub struct CommentNode {
    /// The comment text.
    pub text: String,

    /// The comment's `depends on` conditions.
    pub depends_on: Vec<Expr>,

    /// The conjunction of enclosing conditions at the definition site, if any.
    pub enclosing: Vec<Expr>,

    /// The location of the `comment` keyword line.
    pub location: Location,
}

/// An item in a menu or at the top level of the hierarchy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Item {
    /// A symbol defined at this level.
    Symbol(SymbolId),

    /// A choice defined at this level.
    Choice(ChoiceId),

    /// A menu defined at this level.
    Menu(MenuId),

    /// A comment at this level.
    Comment(CommentId),
}

/// The result of looking a name up in a [`SymbolGraph`] with [`SymbolGraph::resolve`].
#[derive(Clone, Copy, Debug)]
pub enum Resolved<'a> {
    /// A symbol with the given name.
    Symbol(&'a Symbol),

    /// A choice with the given name.
    Choice(&'a ChoiceNode),

    /// A menu with the given title.
    Menu(&'a MenuNode),

    /// A comment with the given text.
    Comment(&'a CommentNode),

    /// Nothing in the graph matches the name.
    NotFound,
}

/// An immutable dependency graph over the symbols of a Kconfig hierarchy.
#[derive(Clone, Debug, Default)]
pub struct SymbolGraph {
    symbols: SlotMap<SymbolId, Symbol>,
    choices: SlotMap<ChoiceId, ChoiceNode>,
    menus: SlotMap<MenuId, MenuNode>,
    comments: SlotMap<CommentId, CommentNode>,

    by_name: HashMap<String, SymbolId>,
    choices_by_name: HashMap<String, ChoiceId>,

    /// Symbols in intern order (definition order, references after their first occurrence).
    order: Vec<SymbolId>,
    choice_order: Vec<ChoiceId>,
    menu_order: Vec<MenuId>,
    comment_order: Vec<CommentId>,

    /// Top-level items in declaration order.
    items: Vec<Item>,

    mainmenu: Option<String>,

    /// Forward dependency edges: the symbol's value or visibility mentions the targets.
    deps: SecondaryMap<SymbolId, BTreeSet<SymbolId>>,

    /// Inverse of `deps`.
    rdeps: SecondaryMap<SymbolId, BTreeSet<SymbolId>>,

    selected_by: SecondaryMap<SymbolId, Vec<ReverseDep>>,
    implied_by: SecondaryMap<SymbolId, Vec<ReverseDep>>,
}

impl Symbol {
    /// Whether the symbol carries a prompt, directly or via `menuconfig`.
    pub fn has_prompt(&self) -> bool {
        !self.prompts.is_empty() || self.menuconfig
    }

    /// The fully conjoined condition under which the symbol's prompt is applicable.
    ///
    /// This is the conjunction of the symbol's own `depends on` conditions with, for prompted
    /// symbols only, the enclosing `if` and `menu` conditions of each definition site. Symbols
    /// without a prompt do not inherit the enclosing scope. Returns `None` when the symbol is
    /// unconditional.
    pub fn effective_depends_on(&self) -> Option<Expr> {
        let mut parts = self.depends_on.clone();

        if self.has_prompt() {
            parts.extend(self.enclosing.iter().cloned());
        }

        Expr::conjoin(parts)
    }
}

impl SymbolGraph {
    /// Look up a symbol id by name.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// Get a symbol by id.
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Iterate over all symbols in definition order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().map(|&id| &self.symbols[id])
    }

    /// Get a choice by id.
    pub fn choice(&self, id: ChoiceId) -> Option<&ChoiceNode> {
        self.choices.get(id)
    }

    /// Iterate over all choices in definition order.
    pub fn choices(&self) -> impl Iterator<Item = &ChoiceNode> {
        self.choice_order.iter().map(|&id| &self.choices[id])
    }

    /// Get a menu by id.
    pub fn menu(&self, id: MenuId) -> Option<&MenuNode> {
        self.menus.get(id)
    }

    /// Iterate over all menus in definition order.
    pub fn menus(&self) -> impl Iterator<Item = &MenuNode> {
        self.menu_order.iter().map(|&id| &self.menus[id])
    }

    /// Get a comment by id.
    pub fn comment(&self, id: CommentId) -> Option<&CommentNode> {
        self.comments.get(id)
    }

    /// The `mainmenu` title, if one was declared.
    pub fn mainmenu(&self) -> Option<&str> {
        self.mainmenu.as_deref()
    }

    /// The top-level items of the hierarchy, in declaration order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Resolve a name to whatever node carries it.
    ///
    /// Symbols are consulted first, then named choices, then menus by title, then comments by
    /// text.
    pub fn resolve(&self, name: &str) -> Resolved {
        if let Some(id) = self.by_name.get(name) {
            return Resolved::Symbol(&self.symbols[*id]);
        }

        if let Some(id) = self.choices_by_name.get(name) {
            return Resolved::Choice(&self.choices[*id]);
        }

        if let Some(menu) = self.menu_order.iter().map(|&id| &self.menus[id]).find(|m| m.title == name) {
            return Resolved::Menu(menu);
        }

        if let Some(comment) = self.comment_order.iter().map(|&id| &self.comments[id]).find(|c| c.text == name) {
            return Resolved::Comment(comment);
        }

        Resolved::NotFound
    }

    /// The effective depends-on condition for the named symbol.
    ///
    /// Returns `None` when the symbol is unknown or unconditional. See
    /// [`Symbol::effective_depends_on`].
    pub fn effective_depends_on(&self, name: &str) -> Option<Expr> {
        let id = self.lookup(name)?;
        self.symbols[id].effective_depends_on()
    }

    /// The names of every symbol whose value or visibility depends, directly or transitively,
    /// on the named symbol.
    ///
    /// Unknown names yield an empty set.
    pub fn dependents(&self, name: &str) -> BTreeSet<&str> {
        let mut result = BTreeSet::new();
        let Some(start) = self.lookup(name) else {
            return result;
        };

        let mut queue = VecDeque::from([start]);
        let mut seen = BTreeSet::from([start]);

        while let Some(id) = queue.pop_front() {
            let Some(rdeps) = self.rdeps.get(id) else {
                continue;
            };

            for &rdep in rdeps {
                if seen.insert(rdep) {
                    result.insert(self.symbols[rdep].name.as_str());
                    queue.push_back(rdep);
                }
            }
        }

        result
    }

    /// Whether `from`'s value or visibility transitively depends on `on`.
    pub fn depends_transitively(&self, from: &str, on: &str) -> bool {
        let (Some(from), Some(on)) = (self.lookup(from), self.lookup(on)) else {
            return false;
        };

        let mut queue = VecDeque::from([from]);
        let mut seen = BTreeSet::from([from]);

        while let Some(id) = queue.pop_front() {
            let Some(deps) = self.deps.get(id) else {
                continue;
            };

            for &dep in deps {
                if dep == on {
                    return true;
                }

                if seen.insert(dep) {
                    queue.push_back(dep);
                }
            }
        }

        false
    }

    /// The condition under which the named symbol is forced on by `select` statements.
    ///
    /// This is the disjunction over every selector of `SELECTOR && <condition>`. Returns
    /// `None` when nothing selects the symbol.
    pub fn reverse_dependencies(&self, name: &str) -> Option<Expr> {
        let id = self.lookup(name)?;
        self.reverse_dep_expr(self.selected_by.get(id)?)
    }

    /// The condition under which the named symbol is suggested on by `imply` statements.
    ///
    /// Returns `None` when nothing implies the symbol.
    pub fn weak_reverse_dependencies(&self, name: &str) -> Option<Expr> {
        let id = self.lookup(name)?;
        self.reverse_dep_expr(self.implied_by.get(id)?)
    }

    /// The `select` edges pointing at the named symbol.
    pub fn selected_by(&self, name: &str) -> &[ReverseDep] {
        self.lookup(name).and_then(|id| self.selected_by.get(id)).map_or(&[], Vec::as_slice)
    }

    /// The `imply` edges pointing at the named symbol.
    pub fn implied_by(&self, name: &str) -> &[ReverseDep] {
        self.lookup(name).and_then(|id| self.implied_by.get(id)).map_or(&[], Vec::as_slice)
    }

    fn reverse_dep_expr(&self, edges: &[ReverseDep]) -> Option<Expr> {
        Expr::disjoin(edges.iter().map(|edge| {
            let source = Expr::Symbol(self.symbols[edge.source].name.clone());
            match &edge.condition {
                Some(cond) => Expr::And(Box::new(source), Box::new(cond.clone())),
                None => source,
            }
        }))
    }
}

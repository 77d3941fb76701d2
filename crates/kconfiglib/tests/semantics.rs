//! End-to-end checks of graph construction and evaluation over on-disk fixtures.

use {
    kconfig_graph_lib::{
        parser::{KConfig, PeekableChars, Tristate, Type},
        Assignment, Evaluator, Resolved, SymbolGraph, Value,
    },
    std::{
        collections::{BTreeSet, HashMap},
        path::{Path, PathBuf},
    },
};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn load(name: &str) -> SymbolGraph {
    let dir = data_dir();
    let mut context = HashMap::new();
    context.insert("FIXTURE_DIR".to_string(), dir.to_string_lossy().into_owned());

    let kconfig = KConfig::parse(&dir.join(name), &dir, &context).unwrap();
    SymbolGraph::build(&kconfig).unwrap()
}

#[test_log::test]
fn effective_dependencies_follow_prompts() {
    let graph = load("Kdep");

    assert!(graph.effective_depends_on("D9").unwrap().references("D"));
    assert!(graph.effective_depends_on("D10").unwrap().references("D"));
    assert!(graph.effective_depends_on("D11").unwrap().references("D"));

    // Promptless symbols do not pick up the enclosing scope.
    assert!(graph.effective_depends_on("NO_DEPEND").is_none());
    assert!(graph.effective_depends_on("D12").is_none());

    let advanced = graph.symbol(graph.lookup("ADVANCED").unwrap()).unwrap();
    assert_eq!(advanced.r#type, Type::Tristate);
    assert!(graph.effective_depends_on("ADVANCED").unwrap().references("BASIC"));
}

#[test_log::test]
fn dependents_cross_menus_and_defaults() {
    let graph = load("Kdep");
    assert_eq!(graph.dependents("D"), BTreeSet::from(["D10", "D11", "D12", "D9"]));
}

#[test_log::test]
fn choice_members_depend_on_each_other() {
    let graph = load("Kdep");

    assert_eq!(graph.dependents("A"), BTreeSet::from(["B", "C"]));
    assert_eq!(graph.dependents("S"), BTreeSet::from(["A", "B", "C"]));
}

#[test_log::test]
fn transitive_dependencies() {
    let graph = load("Kdep");

    assert!(graph.depends_transitively("D12", "D11"));
    assert!(graph.depends_transitively("D12", "D"));
    assert!(!graph.depends_transitively("NO_DEPEND", "D"));
    assert!(!graph.depends_transitively("D", "D9"));
}

#[test_log::test]
fn chains_propagate_through_choices() {
    let graph = load("Kchain");

    assert_eq!(graph.dependents("CHAIN_1"), BTreeSet::from(["CHAIN_21", "CHAIN_22", "CHAIN_26", "DUMMY_1"]));
    assert!(graph.depends_transitively("CHAIN_26", "CHAIN_1"));

    let Resolved::Choice(choice) = graph.resolve("CHAIN_CHOICE_1") else {
        panic!("CHAIN_CHOICE_1 did not resolve to a choice");
    };

    let members: Vec<&str> = choice.members.iter().map(|&id| graph.symbol(id).unwrap().name.as_str()).collect();
    assert_eq!(members, ["CHAIN_22", "DUMMY_1"]);
}

#[test_log::test]
fn help_text_extraction() {
    let graph = load("Khelp");
    let help = |name: &str| graph.symbol(graph.lookup(name).unwrap()).unwrap().help.clone();

    assert_eq!(help("TRICKY_HELP").as_deref(), Some("First line.\n  Indented two more.\n\nAfter a blank line.\n"));
    assert_eq!(help("TERMINATED_BY_COMMENT").as_deref(), Some("Text line.\n"));
    assert_eq!(help("EMPTY_HELP").as_deref(), Some(""));
    assert_eq!(help("NO_HELP"), None);
}

#[test_log::test]
fn resolve_finds_every_node_kind() {
    let graph = load("Kdep");

    assert!(matches!(graph.resolve("D"), Resolved::Symbol(_)));
    assert!(matches!(graph.resolve("outer"), Resolved::Menu(_)));
    assert!(matches!(graph.resolve("end of fixtures"), Resolved::Comment(_)));
    assert!(matches!(graph.resolve("nonesuch"), Resolved::NotFound));
}

#[test_log::test]
fn graphs_survive_a_round_trip() {
    let graph = load("Kdep");
    let text = graph.to_kconfig();

    let reparsed = KConfig::parse_str(PeekableChars::new(&text, Path::new("round-trip")), Path::new("/"), &())
        .unwrap_or_else(|e| panic!("reparse failed: {e}\n{text}"));
    let rebuilt = SymbolGraph::build(&reparsed).unwrap();

    let defined =
        |g: &SymbolGraph| -> Vec<String> { g.symbols().filter(|s| s.defined).map(|s| s.name.clone()).collect() };
    assert_eq!(defined(&rebuilt), defined(&graph));
    assert_eq!(rebuilt.mainmenu(), graph.mainmenu());

    for symbol in graph.symbols().filter(|s| s.defined) {
        let again = rebuilt.symbol(rebuilt.lookup(&symbol.name).unwrap()).unwrap();
        assert_eq!(again.r#type, symbol.r#type, "{}", symbol.name);
        assert_eq!(
            rebuilt.effective_depends_on(&symbol.name).map(|e| e.to_string()),
            graph.effective_depends_on(&symbol.name).map(|e| e.to_string()),
            "{}",
            symbol.name
        );
    }
}

#[test_log::test]
fn sources_are_inlined() {
    let graph = load("Ksource");

    let included = graph.symbol(graph.lookup("INCLUDED").unwrap()).unwrap();
    assert!(included.defined);
    assert!(graph.effective_depends_on("INCLUDED").unwrap().references("TOP"));
    assert_eq!(graph.mainmenu(), Some("Source fixtures"));
}

#[test_log::test]
fn values_flow_through_defaults() {
    let graph = load("Kdep");

    let assignment = Assignment::new();
    let eval = Evaluator::new(&graph, &assignment);
    assert_eq!(eval.symbol_value("ADVANCED").unwrap(), Value::Tristate(Tristate::Maybe));
    assert_eq!(eval.symbol_value("D12").unwrap(), Value::Tristate(Tristate::False));

    let mut assignment = Assignment::new();
    assignment.set("BASIC", Tristate::True);
    assignment.set("D11", Tristate::Maybe);
    let eval = Evaluator::new(&graph, &assignment);
    assert_eq!(eval.symbol_value("ADVANCED").unwrap(), Value::Tristate(Tristate::False));
    assert_eq!(eval.symbol_value("D12").unwrap(), Value::Tristate(Tristate::Maybe));
}

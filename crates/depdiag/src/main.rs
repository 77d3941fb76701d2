//! Generate a GraphViz or Mermaid.js diagram showing the dependencies in Kconfig symbols.

use {
    clap::{builder::PossibleValue, Parser, ValueEnum},
    kconfig_graph_lib::{
        parser::{Expr, KConfig, Tristate},
        Assignment, ChoiceNode, Evaluator, Symbol, SymbolGraph, Value,
    },
    std::{
        collections::{BTreeSet, HashMap},
        fmt::{self, Display, Result as FmtResult},
        fs::File,
        io::{stdout, Result as IoResult, Write},
        path::{Path, PathBuf},
        process,
    },
};

#[derive(Clone, Copy, Debug, Default)]
enum OutputFormat {
    /// Output in GraphViz format.
    #[default]
    GraphViz,

    /// Output in Mermaid.js format.
    Mermaid,
}

impl ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::GraphViz, Self::Mermaid]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::GraphViz => PossibleValue::new("graphviz").alias("GraphViz").help("Output in GraphViz format"),
            Self::Mermaid => PossibleValue::new("mermaid")
                .alias("mermaidjs")
                .alias("mermaid.js")
                .alias("Mermaid")
                .alias("MermaidJS")
                .help("Output in Mermaid.js format"),
        })
    }
}

/// Command line options for the generator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Options {
    /// The path to the top-level Kconfig file.
    #[arg(env = "KCONFIG")]
    kconfig: PathBuf,

    /// The base directory for resolving `source` directives. Defaults to the Kconfig file's
    /// directory.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// An environment variable to expand in `source` directives, as KEY=VALUE. May be repeated.
    #[arg(long = "env", value_parser = parse_env_var)]
    env: Vec<(String, String)>,

    /// A symbol value to assign before rendering, as NAME=VALUE. Values y, m, and n are read as
    /// tristates, 0x-prefixed values as hex, plain integers as int, and everything else as a
    /// string. May be repeated; node labels are annotated with the evaluated values.
    #[arg(long = "set", value_parser = parse_assignment)]
    set: Vec<(String, Value)>,

    /// The format to output the diagram in.
    #[arg(long, short, default_value = "graphviz")]
    format: OutputFormat,

    /// The background color to use for choice nodes.
    #[arg(long, default_value = "#aaffaa")]
    choice_bgcolor: String,

    /// The background color to use for config nodes.
    #[arg(long, default_value = "#ffaaaa")]
    config_bgcolor: String,

    /// The background color to use for menuconfig nodes.
    #[arg(long, default_value = "#ffaaff")]
    menuconfig_bgcolor: String,

    /// The output file to write the diagram to.
    #[arg(long, short, default_value = "-")]
    output: String,
}

fn parse_env_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got \"{s}\"")),
    }
}

fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let Some((name, value)) = s.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got \"{s}\""));
    };

    let value = if let Some(tristate) = Tristate::from_name(value) {
        Value::Tristate(tristate)
    } else if let Some(digits) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        match u64::from_str_radix(digits, 16) {
            Ok(h) => Value::Hex(h),
            Err(e) => return Err(format!("invalid hex value \"{value}\": {e}")),
        }
    } else if let Ok(i) = value.parse::<i64>() {
        Value::Int(i)
    } else {
        Value::String(value.to_string())
    };

    Ok((name.to_string(), value))
}

fn main() -> IoResult<()> {
    env_logger::init();
    let options = Options::parse();

    let context: HashMap<String, String> = options.env.iter().cloned().collect();

    let base_dir = match &options.base_dir {
        Some(dir) => dir.clone(),
        None => options.kconfig.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
    };

    let kconfig = match KConfig::parse(&options.kconfig, &base_dir, &context) {
        Ok(kconfig) => kconfig,
        Err(e) => {
            log::error!("Failed to parse {}: {e}", options.kconfig.display());
            process::exit(1);
        }
    };

    let graph = match SymbolGraph::build(&kconfig) {
        Ok(graph) => graph,
        Err(e) => {
            log::error!("Failed to build the symbol graph: {e}");
            process::exit(1);
        }
    };

    let mut assignment = Assignment::new();
    for (name, value) in &options.set {
        assignment.set(name.clone(), value.clone());
    }

    let evaluator = (!options.set.is_empty()).then(|| Evaluator::new(&graph, &assignment));

    if options.output == "-" {
        write_graph(&mut stdout(), &graph, evaluator.as_ref(), &options)
    } else {
        let mut fd = File::create(&options.output)?;
        write_graph(&mut fd, &graph, evaluator.as_ref(), &options)
    }
}

fn write_graph<W: Write>(
    writer: &mut W,
    graph: &SymbolGraph,
    evaluator: Option<&Evaluator>,
    options: &Options,
) -> IoResult<()> {
    let mut formatter: Box<dyn Formatter + '_> = match options.format {
        OutputFormat::GraphViz => Box::new(GraphVizFormatter { writer, options }),
        OutputFormat::Mermaid => Box::new(MermaidFormatter { writer, options }),
    };

    formatter.write_graph(graph, evaluator)
}

struct GraphVizFormatter<'a, 'b, W: Write> {
    options: &'a Options,
    writer: &'b mut W,
}

struct MermaidFormatter<'a, 'b, W: Write> {
    options: &'a Options,
    writer: &'b mut W,
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum NodeType {
    Config,
    MenuConfig,
    Choice,
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum EdgeType {
    ChoiceMember,
    DependsOn,
    Defaults,
    Implies,
    Selects,
}

impl Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> FmtResult {
        f.write_str(match self {
            Self::ChoiceMember => "choice member",
            Self::DependsOn => "depends on",
            Self::Defaults => "defaults",
            Self::Implies => "implies",
            Self::Selects => "selects",
        })
    }
}

/// The symbol names referenced anywhere in a set of expressions, deduplicated.
fn expr_refs(exprs: &[Expr]) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();

    for expr in exprs {
        expr.for_each_symbol(&mut |name| {
            refs.insert(name.to_string());
        });
    }

    refs
}

trait Formatter {
    fn write_graph_start(&mut self, graph: &SymbolGraph) -> IoResult<()>;
    fn write_graph_end(&mut self) -> IoResult<()>;

    fn write_node(&mut self, name: &str, node_type: NodeType, value: Option<&Value>) -> IoResult<()>;
    fn write_edge(&mut self, source: &str, target: &str, edge_type: EdgeType) -> IoResult<()>;

    fn write_graph(&mut self, graph: &SymbolGraph, evaluator: Option<&Evaluator>) -> IoResult<()> {
        self.write_graph_start(graph)?;

        for symbol in graph.symbols() {
            if !symbol.defined {
                continue;
            }

            let value = match evaluator {
                Some(evaluator) => match evaluator.symbol_value(&symbol.name) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        log::warn!("Failed to evaluate {}: {e}", symbol.name);
                        None
                    }
                },
                None => None,
            };

            self.visit_symbol(graph, symbol, value.as_ref())?;
        }

        for (n, choice) in graph.choices().enumerate() {
            let label = match &choice.name {
                Some(name) => name.clone(),
                None => format!("choice_{n}"),
            };

            self.visit_choice(graph, choice, &label)?;
        }

        self.write_graph_end()
    }

    fn visit_symbol(&mut self, graph: &SymbolGraph, symbol: &Symbol, value: Option<&Value>) -> IoResult<()> {
        let node_type = if symbol.menuconfig {
            NodeType::MenuConfig
        } else {
            NodeType::Config
        };

        self.write_node(&symbol.name, node_type, value)?;

        for select in &symbol.selects {
            if let Some(target) = graph.symbol(select.target) {
                self.write_edge(&symbol.name, &target.name, EdgeType::Selects)?;
            }
        }

        for imply in &symbol.implies {
            if let Some(target) = graph.symbol(imply.target) {
                self.write_edge(&symbol.name, &target.name, EdgeType::Implies)?;
            }
        }

        if let Some(depends) = symbol.effective_depends_on() {
            for dep in expr_refs(std::slice::from_ref(&depends)) {
                self.write_edge(&dep, &symbol.name, EdgeType::DependsOn)?;
            }
        }

        let conditions: Vec<Expr> =
            symbol.defaults.iter().filter_map(|default| default.condition.clone()).collect();
        for dep in expr_refs(&conditions) {
            self.write_edge(&dep, &symbol.name, EdgeType::Defaults)?;
        }

        Ok(())
    }

    fn visit_choice(&mut self, graph: &SymbolGraph, choice: &ChoiceNode, label: &str) -> IoResult<()> {
        self.write_node(label, NodeType::Choice, None)?;

        for member in &choice.members {
            if let Some(symbol) = graph.symbol(*member) {
                self.write_edge(&symbol.name, label, EdgeType::ChoiceMember)?;
            }
        }

        let mut conditions = choice.depends_on.clone();
        conditions.extend(choice.enclosing.iter().cloned());
        for dep in expr_refs(&conditions) {
            self.write_edge(&dep, label, EdgeType::DependsOn)?;
        }

        Ok(())
    }
}

impl<'a, 'b, W: Write> Formatter for GraphVizFormatter<'a, 'b, W> {
    fn write_graph_start(&mut self, graph: &SymbolGraph) -> IoResult<()> {
        writeln!(self.writer, r#"digraph "{}" {{"#, graph.mainmenu().unwrap_or("kconfig_dependencies"))?;
        writeln!(self.writer, r#"    fontname="Helvetica""#)?;
        writeln!(self.writer, r#"    fontsize="10""#)?;
        writeln!(self.writer, r#"    graph [rankdir=LR]"#)?;
        writeln!(self.writer, r#"    node [shape=box]"#)
    }

    fn write_graph_end(&mut self) -> IoResult<()> {
        writeln!(self.writer, r#"}}"#)
    }

    fn write_node(&mut self, name: &str, node_type: NodeType, value: Option<&Value>) -> IoResult<()> {
        let bgcolor = match node_type {
            NodeType::Config => self.options.config_bgcolor.clone(),
            NodeType::MenuConfig => self.options.menuconfig_bgcolor.clone(),
            NodeType::Choice => self.options.choice_bgcolor.clone(),
        };

        writeln!(self.writer, r#"    node [bgcolor="{}"] {}"#, bgcolor, name)?;

        if let Some(value) = value {
            writeln!(self.writer, r#"    {} [label="{} = {}"]"#, name, name, value)?;
        }

        Ok(())
    }

    fn write_edge(&mut self, source: &str, target: &str, edge_type: EdgeType) -> IoResult<()> {
        writeln!(self.writer, r#"    {} -> {} [label="{}"]"#, source, target, edge_type)
    }
}

impl<'a, 'b, W: Write> Formatter for MermaidFormatter<'a, 'b, W> {
    fn write_graph_start(&mut self, graph: &SymbolGraph) -> IoResult<()> {
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "title: {}", graph.mainmenu().unwrap_or("Kconfig dependencies"))?;
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "classDiagram")
    }

    fn write_graph_end(&mut self) -> IoResult<()> {
        Ok(())
    }

    fn write_node(&mut self, name: &str, _node_type: NodeType, value: Option<&Value>) -> IoResult<()> {
        if let Some(value) = value {
            writeln!(self.writer, r#"    {} : {}"#, name, value)?;
        }

        Ok(())
    }

    fn write_edge(&mut self, source: &str, target: &str, edge_type: EdgeType) -> IoResult<()> {
        writeln!(self.writer, r#"    {} <.. {} :{}"#, target, source, edge_type)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{parse_assignment, parse_env_var},
        kconfig_graph_lib::{parser::Tristate, Value},
    };

    #[test_log::test]
    fn assignment_values_are_typed() {
        assert_eq!(parse_assignment("A=y").unwrap(), ("A".to_string(), Value::Tristate(Tristate::True)));
        assert_eq!(parse_assignment("A=m").unwrap(), ("A".to_string(), Value::Tristate(Tristate::Maybe)));
        assert_eq!(parse_assignment("A=0x37").unwrap(), ("A".to_string(), Value::Hex(0x37)));
        assert_eq!(parse_assignment("A=-12").unwrap(), ("A".to_string(), Value::Int(-12)));
        assert_eq!(parse_assignment("A=hello").unwrap(), ("A".to_string(), Value::String("hello".to_string())));
        assert!(parse_assignment("A").is_err());
        assert!(parse_assignment("A=0xzz").is_err());
    }

    #[test_log::test]
    fn env_vars_split_on_first_equals() {
        assert_eq!(parse_env_var("K=a=b").unwrap(), ("K".to_string(), "a=b".to_string()));
        assert!(parse_env_var("K").is_err());
    }
}

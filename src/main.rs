use std::sync::Arc;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use parsetree_inspector::export;
use parsetree_inspector::mirror::{MirrorNode, build_mirror};
use parsetree_inspector::session::DEFAULT_SCALE;
use parsetree_inspector::view::{RenderableView, TreeView};
use parsetree_inspector::{ParseTreeDoc, RuleNames, Session, SourceTree};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a parser's syntax tree", long_about = None)]
struct Cli {
    /// JSON parse tree dump (document with `root` or a bare node)
    #[arg(value_name = "TREE_JSON")]
    tree: Utf8PathBuf,

    /// Rule names, one per line; overrides names embedded in the dump
    #[arg(long = "rule-names", value_name = "FILE")]
    rule_names: Option<Utf8PathBuf>,

    /// Initial view scale
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive inspector and wait until it is closed
    #[cfg(feature = "egui")]
    Show,
    /// Print the tree as an ASCII outline; `!` marks subtrees with errors
    Outline,
    /// Render the tree to PNG without opening a window
    Export {
        /// Output file; defaults to the first free parse_tree[_N].png in the cwd
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let text = std::fs::read_to_string(&cli.tree).with_context(|| format!("Open {}", cli.tree))?;
    let mut doc = ParseTreeDoc::from_json(&text).with_context(|| format!("Failed to parse {}", cli.tree))?;
    if let Some(p) = &cli.rule_names {
        let names = std::fs::read_to_string(p).with_context(|| format!("Open {}", p))?;
        doc.rule_names = RuleNames::from_lines(&names);
    }
    let root: Arc<dyn SourceTree> = Arc::new(doc.root);
    let session = Session::new(root, doc.rule_names).with_scale(cli.scale);

    match cli.command {
        #[cfg(feature = "egui")]
        Command::Show => parsetree_inspector::egui_app::run_inspector(session),
        Command::Outline => {
            let Some(mirror) = build_mirror(Some(session.root().as_ref())) else {
                return Ok(());
            };
            print_outline(&mirror, &session, "", true);
            Ok(())
        }
        Command::Export { output } => {
            let view = TreeView::for_session(&session);
            let path = output
                .map(Utf8PathBuf::into_std_path_buf)
                .unwrap_or_else(export::default_export_path);
            let bitmap = export::rasterize(&view)?;
            export::write_png(&bitmap, &path)?;
            let size = view.size();
            println!("{} ({}x{})", path.display(), size.width, size.height);
            Ok(())
        }
    }
}

fn print_outline(node: &MirrorNode, session: &Session, prefix: &str, is_root: bool) {
    let mark = if node.error_in_subtree { "! " } else { "" };
    if is_root {
        println!("{}{}", mark, node.text(session));
    }
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == node.children.len();
        let branch = if last { "└─" } else { "├─" };
        let child_mark = if child.error_in_subtree { "! " } else { "" };
        println!("{}{} {}{}", prefix, branch, child_mark, child.text(session));
        let new_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
        print_outline(child, session, &new_prefix, false);
    }
}

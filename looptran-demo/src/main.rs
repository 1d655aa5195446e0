use anyhow::Result;
use clap::Command;
use looptran::autopar;
use looptran::autopar::Overrides;
use looptran::config::Config;
use looptran::ir;
use looptran::ir::Node;
use looptran::shared::Shared;
use looptran::shared::SharedExt;
use std::path::Path;

/// Build the tree the external compiler would hand to a script for:
///
/// ```fortran
/// DO j = 1, n
///   DO i = 1, n
///     arr(i,j) = 0.0
///   END DO
/// END DO
/// DO i = 1, n
///   b(i) = 1.0
/// END DO
/// ```
fn sample_schedule() -> Shared<Node> {
    let inner_body = ir::assignment(
        ir::array_reference("arr", vec![ir::reference("i"), ir::reference("j")]),
        ir::literal("0.0"),
    );
    let inner = ir::do_loop(
        "i",
        ir::literal("1"),
        ir::reference("n"),
        ir::literal("1"),
        vec![inner_body],
    );
    let nest = ir::do_loop(
        "j",
        ir::literal("1"),
        ir::reference("n"),
        ir::literal("1"),
        vec![inner],
    );
    let tail_body = ir::assignment(
        ir::array_reference("b", vec![ir::reference("i")]),
        ir::literal("1.0"),
    );
    let tail = ir::do_loop(
        "i",
        ir::literal("1"),
        ir::reference("n"),
        ir::literal("1"),
        vec![tail_body],
    );
    ir::schedule(vec![nest, tail])
}

fn cli() -> Command {
    Command::new("looptran-demo").args(looptran::script_arguments())
}

fn run(config: &Config, print_before: bool, print_after: bool) -> Result<usize> {
    let root = sample_schedule();
    if print_before {
        println!("{}", root.rd());
    }
    let annotated = autopar::auto_parallelise(&root, &Overrides::default(), config)?;
    if print_after {
        println!("{}", root.rd());
    }
    Ok(annotated)
}

fn main() -> Result<()> {
    looptran::init_subscriber(tracing::Level::INFO).ok();
    let matches = cli().get_matches();
    let config_path = matches.get_one::<String>("config").map(Path::new);
    let config = Config::load(config_path)?;
    let print_before = matches.get_flag("print-tree-before");
    let print_after = matches.get_flag("print-tree-after");
    let annotated = run(&config, print_before, print_after)?;
    eprintln!("annotated {annotated} loop(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help() {
        let cli = cli();
        let result = cli.try_get_matches_from(vec!["looptran-demo", "--help"]);
        let err = match result {
            Ok(_) => panic!("Expected an error"),
            Err(e) => e,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Usage: looptran-demo"));
        assert!(rendered.contains("--print-tree-after"));
    }

    #[test]
    fn annotates_both_outer_loops() {
        let config = Config::default();
        let annotated = run(&config, false, false).unwrap();
        assert_eq!(annotated, 2);
    }
}

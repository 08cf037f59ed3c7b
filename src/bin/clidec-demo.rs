// src/bin/clidec-demo.rs

use anyhow::Result;

use clidec::system::executor;
use clidec::{
    ArgSpec, Args, Arity, Container, Dispatcher, Namespace, Settings, ValueType, argument,
    describe, namespace, root, with_commands,
};

/// Entry point of the demo program.
fn main() {
    // Logs go to stderr: `RUST_LOG=debug clidec-demo ...`
    env_logger::init();

    if let Err(e) = run_cli() {
        eprintln!("\nError: {:?}", e);
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let app = build_cli()?;
    let settings = Settings::default()
        .prog("clidec-demo")
        .version(env!("CARGO_PKG_VERSION"));
    Dispatcher::new(&app).settings(settings).run()?;
    Ok(())
}

/// Declares the whole command tree.
fn build_cli() -> Result<Namespace> {
    let mut app = root(vec![
        describe("Demo program for declarative command trees."),
        argument(
            ArgSpec::switch("verbose")
                .short('v')
                .arity(Arity::Count)
                .help("More output (repeatable)"),
        ),
        argument(
            ArgSpec::option("profile")
                .default_value("dev")
                .help("Build profile"),
        ),
    ])?;

    app.command(
        greet,
        vec![
            describe("Print a greeting"),
            argument(ArgSpec::option("name").short('n').default_value("world")),
            argument(
                ArgSpec::option("times")
                    .value_type(ValueType::Int)
                    .default_value("1"),
            ),
        ],
    )?;

    app.command(
        inspect,
        vec![
            describe("Print the bound argument record"),
            argument(
                ArgSpec::option("profile")
                    .default_value("release")
                    .help("Overrides the global profile"),
            ),
        ],
    )?;

    let project = app.namespace("project", vec![describe("Manage projects")])?;
    project.command(
        list,
        vec![
            describe("List known projects"),
            argument(ArgSpec::switch("all").short('a')),
        ],
    )?;
    project.command(
        init,
        vec![
            describe("Create a project"),
            argument(ArgSpec::positional("name")),
            argument(ArgSpec::option("parent").help("Parent project")),
        ],
    )?;

    let run = app.namespace("run", vec![describe("Run external programs")])?;
    run.raw_command(exec, vec![describe("Run a program with the remaining arguments, untouched")])?;

    let mut tools = namespace("tools", vec![describe("Developer tools")])?;
    let fmt = tools.command(fmt, vec![describe("Format sources")])?;
    let lint = tools.command(
        lint,
        vec![
            describe("Lint sources"),
            argument(
                ArgSpec::option("level")
                    .choices(["warn", "deny"])
                    .default_value("warn"),
            ),
        ],
    )?;
    app.add_child(tools);
    app.namespace(
        "dev",
        vec![
            describe("Shortcuts to developer tools"),
            with_commands([fmt, lint]),
        ],
    )?;

    Ok(app)
}

// --- ACTIONS ---

fn greet(args: &Args) -> Result<()> {
    let name = args.str("name").unwrap_or("world");
    for _ in 0..args.int("times").unwrap_or(1) {
        println!("Hello, {}!", name);
    }
    if args.count("verbose") > 0 {
        println!("(profile: {})", args.str("profile").unwrap_or("dev"));
    }
    Ok(())
}

fn inspect(args: &Args) -> Result<()> {
    for (field, value) in args.iter() {
        println!("{} = {}", field, value);
    }
    Ok(())
}

fn list(args: &Args) -> Result<()> {
    println!("global");
    if args.flag("all") {
        println!("global/archive");
    }
    Ok(())
}

fn init(args: &Args) -> Result<()> {
    let name = args
        .str("name")
        .ok_or_else(|| anyhow::anyhow!("'init' needs a project name."))?;
    match args.str("parent") {
        Some(parent) => println!("Created project '{}' under '{}'.", name, parent),
        None => println!("Created project '{}'.", name),
    }
    Ok(())
}

fn exec(args: &Args) -> Result<()> {
    executor::forward_tokens(&args.raw())?;
    Ok(())
}

fn fmt(_args: &Args) -> Result<()> {
    println!("Formatted.");
    Ok(())
}

fn lint(args: &Args) -> Result<()> {
    println!("Linted at level '{}'.", args.str("level").unwrap_or("warn"));
    Ok(())
}

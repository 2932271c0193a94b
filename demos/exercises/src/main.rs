//! Runs the exercises headlessly on a virtual event loop and prints what each
//! screen would show after every interaction.
//!
//! `RUST_LOG=debug` shows the runtime's own transitions (fetches, cache
//! inserts, dropped dispatches, listener changes).

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use statehooks_core::exercises::count_context::{CountProvider, count_button, count_display};
use statehooks_core::exercises::counter::{CounterProps, counter};
use statehooks_core::exercises::media_box::color_box;
use statehooks_core::exercises::pokemon::{InfoVariant, PokemonApp};
use statehooks_core::prelude::*;
use statehooks_core::{Inspector, MediaEnvironment};

#[derive(Parser)]
#[command(name = "statehooks-exercises")]
#[command(about = "Drive the hook exercises without a renderer", long_about = None)]
struct Cli {
    /// Exercise to run
    #[arg(short, long, value_enum, default_value_t = Exercise::All)]
    exercise: Exercise,

    /// Virtual latency of the mocked item source, in milliseconds
    #[arg(short, long, default_value_t = 1500)]
    latency: u64,

    /// Names to look up, in order
    #[arg(short, long, default_values = ["pikachu", "mew"])]
    pokemon: Vec<String>,

    /// Names whose lookup fails with a network error
    #[arg(long)]
    fail: Vec<String>,

    /// Viewport widths the media exercise resizes through
    #[arg(short, long, default_values = ["1200", "800", "300"])]
    widths: Vec<u32>,

    /// Record debug values, as an attached devtools panel would
    #[arg(long)]
    inspect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Exercise {
    Counter,
    Context,
    Async,
    Cache,
    Unmount,
    Media,
    All,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if cli.inspect {
        Inspector::enable();
    }

    let all = cli.exercise == Exercise::All;
    if all || cli.exercise == Exercise::Counter {
        run_counter();
    }
    if all || cli.exercise == Exercise::Context {
        run_context()?;
    }
    if all || cli.exercise == Exercise::Async {
        run_lookup(&cli, InfoVariant::Effect)?;
    }
    if all || cli.exercise == Exercise::Cache {
        run_lookup(&cli, InfoVariant::Cached)?;
    }
    if all || cli.exercise == Exercise::Unmount {
        run_unmount(&cli)?;
    }
    if all || cli.exercise == Exercise::Media {
        run_media(&cli)?;
    }
    Ok(())
}

fn heading(title: &str) {
    println!("\n== {title} ==");
}

fn run_counter() {
    heading("counter");
    let instance = Instance::new("Counter");
    let props = CounterProps::default();

    let screen = instance.compose(|| counter(props));
    println!("initial: {}", screen.count);

    screen.increment_by_function.call(());
    screen.increment_by_function.call(());
    let screen = instance.compose(|| counter(props));
    println!("two clicks through the updater: {}", screen.count);

    screen.increment_by_object.call(());
    screen.increment_by_object.call(());
    let screen = instance.compose(|| counter(props));
    println!("two clicks through the rendered value: {}", screen.count);
}

fn run_context() -> Result<()> {
    heading("count context");
    let provider = CountProvider::default();
    let display = Instance::new("CountDisplay");
    let button = Instance::new("Counter");

    let (_, increment) = provider.provide(|| button.compose(count_button))?;
    for _ in 0..3 {
        increment.call(());
    }
    let view = provider.provide(|| display.compose(count_display))?;
    println!("{view}");

    let orphan = Instance::new("Orphan");
    match orphan.compose(count_display) {
        Ok(view) => bail!("rendered without a provider: {view}"),
        Err(e) => println!("outside the provider: {e}"),
    }
    Ok(())
}

fn config(cli: &Cli) -> FetchConfig {
    cli.fail
        .iter()
        .fold(FetchConfig::default().with_latency(Duration::from_millis(cli.latency)), |c, name| {
            c.failing_on(name.as_str())
        })
}

fn show(app: &PokemonApp) {
    if let Some(view) = app.settle() {
        println!("{view}\n--");
    }
}

fn run_lookup(cli: &Cli, variant: InfoVariant) -> Result<()> {
    heading(match variant {
        InfoVariant::Effect => "async lookup",
        InfoVariant::Cached => "cached lookup",
    });
    let ev = EventLoop::new();
    let api = MockPokemonApi::new(ev.clone(), config(cli)).context("failed to load the item database")?;
    let app = PokemonApp::new(variant, Rc::new(api.clone()));
    show(&app);

    for name in &cli.pokemon {
        log::info!("submitting '{name}'");
        app.submit(name.as_str());
        show(&app);
        ev.run_until_idle();
        show(&app);
        if app.boundary().error().is_some() {
            log::info!("boundary tripped; trying again");
            app.reset();
            show(&app);
        }
    }

    if variant == InfoVariant::Cached
        && let Some(first) = cli.pokemon.first()
    {
        log::info!("selecting '{first}' from history");
        app.select(first.as_str());
        show(&app);
        ev.run_until_idle();
        show(&app);
    }

    println!("fetches issued: {}", api.fetch_count());
    app.unmount();
    Ok(())
}

fn run_unmount(cli: &Cli) -> Result<()> {
    heading("unmount during fetch");
    let ev = EventLoop::new();
    let name = cli.pokemon.first().map(String::as_str).unwrap_or("pikachu");
    let api = MockPokemonApi::new(ev.clone(), config(cli).failing_on(name))
        .context("failed to load the item database")?;

    let scope = Scope::new();
    let runner = AsyncRunner::<Item, FetchError>::new(AsyncState::Idle, scope.liveness());
    runner.subscribe(|state| println!("status: {}", state.status()));

    runner.run(api.fetch(name));
    scope.dispose();
    ev.run_until_idle();
    println!("final status: {}, transitions dropped: {}", runner.state().status(), runner.dropped());
    Ok(())
}

fn run_media(cli: &Cli) -> Result<()> {
    heading("media box");
    let Some((&first, rest)) = cli.widths.split_first() else {
        bail!("at least one viewport width is needed");
    };
    let env = MediaEnvironment::new(first);
    let instance = Instance::new("Box");
    let mut view = instance.compose(|| color_box(&env));

    for &width in std::iter::once(&first).chain(rest) {
        env.resize(width);
        while instance.is_dirty() {
            view = instance.compose(|| color_box(&env));
        }
        println!("{width}px: {view}");
        for label in instance.debug_labels() {
            println!("  {label}");
        }
    }
    instance.unmount();
    Ok(())
}

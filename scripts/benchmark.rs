// scripts/benchmark.rs
use early_exercise::analytics::bs_analytic;
use early_exercise::math_utils::Timer;
use early_exercise::output::{write_convergence_to_csv, write_summary_to_csv, ConvergenceRow};
use early_exercise::{
    BinomialEngine, ExerciseStyle, LsmcConfig, LsmcEngine, MarketData, OptionType,
    PricingEngine, TrinomialEngine, VanillaOption,
};
use std::env;
use std::error::Error;
use std::process::Command;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Self::get_rust_version(),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/cpuinfo")
                .ok()
                .and_then(|content| {
                    content
                        .lines()
                        .find(|line| line.starts_with("model name"))
                        .and_then(|line| line.split(':').nth(1))
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "Unknown CPU".to_string())
        }

        #[cfg(target_os = "macos")]
        {
            Command::new("sysctl")
                .args(["-n", "machdep.cpu.brand_string"])
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown CPU".to_string())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            "Unknown CPU".to_string()
        }
    }

    fn get_rust_version() -> String {
        Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string())
    }
}

/// European put convergence of both lattices to the closed form.
fn run_convergence(market: &MarketData) -> Result<Vec<ConvergenceRow>, Box<dyn Error>> {
    let put = VanillaOption::european(100.0, 1.0, OptionType::Put)?;
    let reference = bs_analytic::european_price(&put, market);
    let mut rows = Vec::new();

    for &steps in &[50, 100, 200, 500, 1000] {
        println!("Lattice convergence with {} steps...", steps);
        let engines: [Box<dyn PricingEngine>; 2] = [
            Box::new(BinomialEngine::new(steps)?),
            Box::new(TrinomialEngine::new(steps)?),
        ];
        for engine in &engines {
            let mut timer = Timer::new();
            timer.start();
            let price = engine.price(&put, market)?;
            rows.push(ConvergenceRow {
                engine: engine.name().to_string(),
                steps,
                price,
                reference,
                time_ms: timer.elapsed_ms(),
            });
        }
    }
    Ok(rows)
}

/// American put across engines, against a deep binomial tree.
fn run_american(market: &MarketData) -> Result<Vec<ConvergenceRow>, Box<dyn Error>> {
    let put = VanillaOption::american(100.0, 1.0, OptionType::Put)?;
    let reference = BinomialEngine::new(5000)?.price(&put, market)?;
    let european = bs_analytic::european_price(&put.with_style(ExerciseStyle::European), market);
    println!(
        "American put reference {:.6} (early-exercise premium {:.6})",
        reference,
        reference - european
    );

    let mut rows = Vec::new();
    let engines: Vec<Box<dyn PricingEngine>> = vec![
        Box::new(BinomialEngine::new(500)?),
        Box::new(TrinomialEngine::new(500)?),
        Box::new(LsmcEngine::new(LsmcConfig::default())?),
    ];
    for engine in &engines {
        println!("Pricing American put with {}...", engine.name());
        let mut timer = Timer::new();
        timer.start();
        let price = engine.price(&put, market)?;
        rows.push(ConvergenceRow {
            engine: engine.name().to_string(),
            steps: 0,
            price,
            reference,
            time_ms: timer.elapsed_ms(),
        });
    }
    Ok(rows)
}

fn print_table(title: &str, rows: &[ConvergenceRow]) {
    println!("\n{:=<80}", "");
    println!("{}", title);
    println!("{:=<80}", "");
    println!(
        "{:<16} {:>8} {:>14} {:>14} {:>12} {:>10}",
        "Engine", "Steps", "Price", "Reference", "Abs Error", "Time (ms)"
    );
    println!("{:-<80}", "");
    for row in rows {
        println!(
            "{:<16} {:>8} {:>14.6} {:>14.6} {:>12.2e} {:>10.2}",
            row.engine,
            row.steps,
            row.price,
            row.reference,
            row.abs_error(),
            row.time_ms
        );
    }
    println!("{:=<80}", "");
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("early-exercise Benchmark Suite");
    println!("==============================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let market = MarketData::new(100.0, 0.05, 0.2, 0.0)?;

    let convergence = run_convergence(&market)?;
    print_table("EUROPEAN PUT LATTICE CONVERGENCE", &convergence);

    let american = run_american(&market)?;
    print_table("AMERICAN PUT ENGINES", &american);

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let convergence_file = format!("convergence_{}.csv", timestamp);
    let american_file = format!("american_{}.csv", timestamp);
    let summary_file = format!("summary_{}.csv", timestamp);

    write_convergence_to_csv(&convergence_file, &convergence)?;
    write_convergence_to_csv(&american_file, &american)?;
    write_summary_to_csv(
        &summary_file,
        &[
            ("os", system_info.os.clone()),
            ("cpu", system_info.cpu_model.clone()),
            ("cpu_cores", system_info.cpu_cores.to_string()),
            ("rust_version", system_info.rust_version.clone()),
            ("rayon_threads", system_info.rayon_threads.to_string()),
            (
                "benchmark_date",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ),
        ],
    )?;

    println!("\nResults saved to: {}, {}, {}", convergence_file, american_file, summary_file);
    println!("Run with RUST_LOG=early_exercise=debug for per-engine diagnostics.");
    Ok(())
}

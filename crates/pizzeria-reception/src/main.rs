use pizzeria_catalog::parse_orders;
use pizzeria_kitchen::SimulatorConfig;
use pizzeria_reception::Reception;
use std::io::{self, BufRead, Write};
use std::time::Duration;

const USAGE_EXIT_CODE: i32 = 84;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: {} <multiplier:double> <cooks_per_kitchen:int> <restock_time_ms:int>", args.first().map(String::as_str).unwrap_or("plazza"));
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    let fifo_prefix = format!("/tmp/plazza_{}", std::process::id());
    let mut reception = match Reception::new(fifo_prefix, config) {
        Ok(reception) => reception,
        Err(err) => {
            log::error!("failed to start reception: {err}");
            std::process::exit(1);
        }
    };

    run_cli(&reception);

    reception.shutdown();
}

fn parse_args(args: &[String]) -> Result<SimulatorConfig, String> {
    if args.len() != 4 {
        return Err(format!("expected 3 arguments, got {}", args.len().saturating_sub(1)));
    }
    let multiplier: f64 = args[1]
        .parse()
        .map_err(|_| format!("invalid multiplier: {:?}", args[1]))?;
    if !(multiplier > 0.0) {
        return Err("multiplier must be > 0".to_string());
    }
    let cooks_per_kitchen: usize = args[2]
        .parse()
        .map_err(|_| format!("invalid cooks_per_kitchen: {:?}", args[2]))?;
    if cooks_per_kitchen == 0 {
        return Err("cooks_per_kitchen must be > 0".to_string());
    }
    let restock_ms: u64 = args[3]
        .parse()
        .map_err(|_| format!("invalid restock_time_ms: {:?}", args[3]))?;
    if restock_ms == 0 {
        return Err("restock_time_ms must be > 0".to_string());
    }

    Ok(SimulatorConfig::new(
        multiplier,
        cooks_per_kitchen,
        Duration::from_millis(restock_ms),
    ))
}

/// Reads one command per line from stdin until `exit` or EOF (spec.md §6).
fn run_cli(reception: &Reception) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                log::warn!("error reading stdin: {err}");
                break;
            }
            None => break, // EOF
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("exit") {
            break;
        }
        if trimmed.eq_ignore_ascii_case("status") {
            // Ask every kitchen to push a fresh snapshot and give the
            // manager thread one tick to apply it before rendering, so
            // `status` reflects near-real-time load rather than whatever
            // happened to arrive last.
            reception.request_all_statuses();
            std::thread::sleep(Duration::from_millis(30));
            println!("{}", reception.render_status());
            continue;
        }

        match parse_orders(trimmed) {
            Ok(pizzas) => {
                if let Err(err) = reception.dispatch_orders(pizzas) {
                    eprintln!("failed to dispatch order: {err}");
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }
}

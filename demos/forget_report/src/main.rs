// =============================================================================
// Forget report — build the three loaders and summarise what was forgotten
// =============================================================================
//
// Reads loader options (from a JSON file, or from flags on top of the
// defaults), assembles train / validation / test loaders on one of the
// built-in synthetic datasets, and prints per-class counts of each partition
// plus how many training labels carry a tombstone.
//
// Usage:
//   cargo run -p forget-report                                  # plain split
//   cargo run -p forget-report -- --classes 3 --mark            # mark class 3
//   cargo run -p forget-report -- --classes 1,2 --count 20 --confuse --split forget
//   cargo run -p forget-report -- --config options.json
//   RUST_LOG=info cargo run -p forget-report                    # with pipeline logs

use unlearn_core::index::class_counts;
use unlearn_core::LabeledArray;
use unlearn_data::{get_loaders, is_marked, LoaderOptions, Registry};

fn parse_list<T: std::str::FromStr>(s: &str, flag: &str) -> Vec<T> {
    s.split(',')
        .map(|v| {
            v.trim().parse().unwrap_or_else(|_| {
                eprintln!("invalid {flag}: {s}");
                std::process::exit(1);
            })
        })
        .collect()
}

/// The value following flag `args[*i]`; advances `i` past it.
fn next_value<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(v) => v,
        None => {
            eprintln!("missing value for {flag} (see --help)");
            std::process::exit(1);
        }
    }
}

fn parse_args() -> unlearn_core::Result<LoaderOptions> {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = LoaderOptions::new("synthetic10").root(".");
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                opts = LoaderOptions::from_json_file(next_value(&args, &mut i))?;
            }
            "--dataset" => opts.dataset_name = next_value(&args, &mut i).to_string(),
            "--classes" => {
                let v = next_value(&args, &mut i);
                opts = opts.class_to_replace(parse_list(v, "--classes"));
            }
            "--indexes" => {
                let v = next_value(&args, &mut i);
                opts = opts.indexes_to_replace(parse_list(v, "--indexes"));
            }
            "--count" => {
                let v = next_value(&args, &mut i);
                opts = opts.num_indexes_to_replace(parse_list::<usize>(v, "--count")[0]);
            }
            "--seed" => {
                let v = next_value(&args, &mut i);
                opts = opts.seed(parse_list::<u64>(v, "--seed")[0]);
            }
            "--split" => opts = opts.split(next_value(&args, &mut i).to_string()),
            "--confuse" => opts = opts.confuse_mode(true),
            "--mark" => opts = opts.only_mark(true),
            "--help" | "-h" => {
                println!("Forget-set report for unlearn");
                println!();
                println!("Options:");
                println!("  --config <path>      Read all options from a JSON file");
                println!("  --dataset <name>     synthetic10 | synthetic_binary (default: synthetic10)");
                println!("  --classes <a,b,..>   Classes to forget (or the pair to confuse)");
                println!("  --indexes <i,j,..>   Train positions to forget");
                println!("  --count <n>          Number of samples to forget / confuse");
                println!("  --seed <n>           Random seed (default: 1)");
                println!("  --split <s>          train | forget (confuse mode only)");
                println!("  --confuse            Enable confuse mode");
                println!("  --mark               Mark labels instead of replacing samples");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    Ok(opts)
}

fn summarise(name: &str, ds: &LabeledArray) {
    let num_classes = ds.max_target().map_or(0, |m| (m + 1).max(0) as usize);
    let marked = ds.targets().iter().filter(|&&t| is_marked(t)).count();
    println!(
        "{name:>6}: {:>5} samples, per class {:?}, marked {marked}",
        ds.len(),
        class_counts(ds.targets(), num_classes)
    );
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let registry = Registry::builtin();
    let result = parse_args().and_then(|opts| {
        log::info!("options: {opts:?}");
        if !registry.contains(&opts.dataset_name) {
            eprintln!("available datasets: {}", registry.names().join(", "));
        }
        get_loaders(&registry, &opts)
    });

    match result {
        Ok(loaders) => {
            summarise("train", loaders.train.dataset());
            summarise("valid", loaders.valid.dataset());
            summarise("test", loaders.test.dataset());
            println!("forgotten positions: {}", loaders.forgotten.len());
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

use std::hash::RandomState;

use clap::Parser;
use flat_hash::HashMap;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: u64,

    #[arg(short = 'l', long = "max_load_factor", default_value_t = 0.7)]
    max_load_factor: f32,

    /// Percentage of keys to erase after filling.
    #[arg(short = 'e', long = "erase_percent", default_value_t = 40)]
    erase_percent: u64,
}

fn print_stats(label: &str, map: &HashMap<u64, u64, RandomState>) {
    println!(
        "{label}: len={} buckets={} tombstones={} load={:.3} capacity={}",
        map.len(),
        map.bucket_count(),
        map.tombstone_count(),
        map.load_factor(),
        map.capacity(),
    );
}

fn main() {
    let args = Args::parse();

    let mut map: HashMap<u64, u64, RandomState> = HashMap::new();
    if let Err(err) = map.set_max_load_factor(args.max_load_factor) {
        eprintln!("{err}");
        std::process::exit(2);
    }

    let mut grew = 0;
    for key in 0..args.count {
        let before = map.bucket_count();
        map.insert_or_assign(key, key * 2);
        if map.bucket_count() != before {
            grew += 1;
        }
    }
    print_stats("filled", &map);
    println!("grew {grew} times");

    let erase = args.count * args.erase_percent.min(100) / 100;
    let mut compactions = 0;
    for key in 0..erase {
        let before = map.tombstone_count();
        map.erase(&key);
        if map.tombstone_count() < before {
            compactions += 1;
        }
    }
    print_stats("erased", &map);
    println!("compacted {compactions} times");

    for key in 0..erase {
        map.insert_or_assign(key, key);
    }
    print_stats("refilled", &map);

    map.rehash(0);
    print_stats("rehashed", &map);
}

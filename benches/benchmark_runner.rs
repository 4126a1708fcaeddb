/// Benchmark runner for prototype lookup and dispatch.
///
/// Times a few representative workloads and prints the average per iteration.

extern crate prototype;

use prototype::model::config::{Resolution, SpaceConfig};
use prototype::model::function::{Args, Function};
use prototype::model::object::ObjectId;
use prototype::model::space::Space;
use prototype::model::value::Value;
use std::time::{Duration, Instant};

/// Run a benchmark and return the execution time.
fn run_benchmark<F: FnMut()>(iterations: u32, mut body: F) -> Duration {
    let start = Instant::now();
    for _ in 0..iterations {
        body();
    }
    start.elapsed()
}

/// A single-parent chain of `depth` prototypes with `x` defined at the root.
fn chain(config: SpaceConfig, depth: usize) -> (Space, ObjectId) {
    let mut space = Space::with_config(config);
    let mut last = space.object().attr("x", 1).build().unwrap();
    for i in 0..depth {
        last = space.object().parent(last).attr(format!("a{}", i), i as i64).build().unwrap();
    }
    (space, last)
}

/// A wide diamond: `width` siblings over a shared root, joined by one leaf.
fn diamond(width: usize) -> (Space, ObjectId) {
    let mut space = Space::new();
    let root = space.object().attr("x", 1).build().unwrap();
    let mut siblings = Vec::with_capacity(width);
    for i in 0..width {
        siblings.push(space.object().parent(root).attr(format!("s{}", i), 0).build().unwrap());
    }
    let mut builder = space.object();
    for s in siblings {
        builder = builder.parent(s);
    }
    let leaf = builder.build().unwrap();
    (space, leaf)
}

fn report(name: &str, iterations: u32, elapsed: Duration) {
    let per_iter = elapsed.as_nanos() / iterations as u128;
    println!("{:<32} {:>10} iters {:>10} ns/iter", name, iterations, per_iter);
}

fn main() {
    println!("prototype benchmarks");
    println!("{}", "=".repeat(64));

    let (space, leaf) = chain(SpaceConfig::new(), 50);
    let elapsed = run_benchmark(10_000, || {
        let _ = space.get(leaf, "x");
    });
    report("c3 lookup, depth 50", 10_000, elapsed);

    let (space, leaf) = chain(
        SpaceConfig::new().with_resolution(Resolution::DepthFirst),
        50,
    );
    let elapsed = run_benchmark(10_000, || {
        let _ = space.get(leaf, "x");
    });
    report("depth-first lookup, depth 50", 10_000, elapsed);

    let (space, leaf) = diamond(32);
    let elapsed = run_benchmark(10_000, || {
        let _ = space.linearize(leaf);
    });
    report("linearize diamond, width 32", 10_000, elapsed);

    let mut space = Space::new();
    let f = Function::new("f", &["n"], |_, args| Ok(Value::Int(args.int(0)? + 1)));
    let base = space.object().method(f).build().unwrap();
    let g = Function::new("f", &["super", "n"], |space, args| {
        let next = space.get_attr(args.get(0)?, "f")?;
        space.call(&next, Args::new().arg(args.get(1)?.clone()))
    });
    let top = space.object().parent(base).method(g).build().unwrap();
    let elapsed = run_benchmark(10_000, || {
        let _ = space.call_method(top, "f", Args::new().arg(1));
    });
    report("resend call", 10_000, elapsed);
}

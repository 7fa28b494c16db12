use exprflow::{ConvertOpts, MemoryGraph, convert_all};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let scene = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => include_str!("../tests/data/rig_scene.json").to_owned(),
    };
    let opts = match args.next() {
        Some(path) => ConvertOpts::from_json(&std::fs::read_to_string(path)?)?,
        None => ConvertOpts::default(),
    };

    let mut graph = MemoryGraph::from_json(&scene)?;
    let report = convert_all(&mut graph, &opts)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    for op in graph.ops() {
        println!("{}", serde_json::to_string(op)?);
    }
    Ok(())
}

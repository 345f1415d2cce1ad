// Dumps the words startable from each tile of the configured map.
// Run with: cargo run --bin perimeter_probe [X Y]
// src/bin/probe.rs
use perimeter_core::config::EngineConfig;
use perimeter_core::core::types::Coord;
use perimeter_core::{Dictionary, Grid};

fn main() -> perimeter_core::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = EngineConfig::load()?;
    let dictionary = Dictionary::load(&config.dictionary_path())?;
    let grid = Grid::load(&config.map_path(), dictionary)?;

    let args: Vec<i32> = std::env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let coords: Vec<Coord> = match args.as_slice() {
        [x, y] => vec![Coord::new(*x, *y)],
        _ => grid.letters().map(|l| l.coord).collect(),
    };

    for coord in coords {
        let Some(letter) = grid.letter_at(coord) else {
            println!("{} => hole", coord);
            continue;
        };
        let words = grid.words_starting_at(coord);
        println!(
            "{} {} => {} words ({} start, {} end here)",
            coord,
            letter.ch,
            words.len(),
            letter.words_starting,
            letter.words_ending
        );
        for word in words {
            println!("    {}", word);
        }
    }

    let stats = grid.stats();
    println!(
        "{} tiles, {} words, {:.2} words/tile",
        stats.tile_count,
        stats.total_words,
        stats.avg_words_per_tile()
    );
    Ok(())
}

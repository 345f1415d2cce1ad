// src/bin/main.rs
//
// Line-driven simulator for the perimeter engine. Each command stands in for
// a touch event a game front end would send.
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use log::{error, info};
use perimeter_core::config::EngineConfig;
use perimeter_core::core::types::Coord;
use perimeter_core::persistence::{load_snapshot, save_snapshot};
use perimeter_core::shuffle::Difficulty;
use perimeter_core::{Board, BoardEvent, Dictionary, PerimeterState};
use std::io::{self, stdin, stdout, Write};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not read config: {}", e);
            std::process::exit(1);
        }
    };
    let mut board = match Board::from_config(&config) {
        Ok(board) => board,
        Err(e) => {
            error!("Could not build the board: {}", e);
            std::process::exit(1);
        }
    };
    let mut rng = rand::thread_rng();
    let mut messages: Vec<String> = Vec::new();

    loop {
        if let Err(e) = print_ui(&board, &messages) {
            error!("Could not draw: {}", e);
            break;
        }
        messages.clear();

        let mut input = String::new();
        match stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("Could not read input: {}", e);
                break;
            }
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            ["exit"] | ["quit"] => break,
            ["tap", x, y] => match (x.parse::<i32>(), y.parse::<i32>()) {
                (Ok(x), Ok(y)) => {
                    let coord = Coord::new(x, y);
                    let accepted = if board.perimeter.current().is_none() {
                        board.touch_started(coord)
                    } else {
                        board.touch_moved(coord)
                    };
                    if !accepted {
                        messages.push(format!("{} refused", coord));
                    }
                }
                _ => messages.push("usage: tap X Y".into()),
            },
            ["end"] | [] => {
                board.touch_ended();
            }
            ["undo"] => {
                if !board.undo() {
                    messages.push("Nothing to undo.".into());
                }
            }
            ["hint"] => {
                board.hint();
            }
            ["reset"] => board.reset(),
            ["shuffle", mode] => {
                let difficulty = match *mode {
                    "easier" => Some(Difficulty::Easier),
                    "harder" => Some(Difficulty::Harder),
                    _ => None,
                };
                match difficulty {
                    Some(difficulty) => {
                        let outcome = board.shuffle(&mut rng, &config.shuffle, difficulty);
                        messages.push(format!(
                            "Shuffled {} tiles: {} -> {} words ({})",
                            outcome.changed,
                            outcome.words_before,
                            outcome.words_after,
                            if outcome.kept { "kept" } else { "reverted" }
                        ));
                    }
                    None => messages.push("usage: shuffle easier|harder".into()),
                }
            }
            ["stats"] => {
                let grid = board.grid.stats();
                let loop_stats = board.perimeter.stats();
                messages.push(format!(
                    "Grid: {} tiles, {} words, {:.2} words/tile, {:.2} letters/tile",
                    grid.tile_count,
                    grid.total_words,
                    grid.avg_words_per_tile(),
                    grid.avg_word_letters_per_tile()
                ));
                messages.push(format!(
                    "Perimeter: {} words, {} tiles, {:.2} avg length",
                    loop_stats.words, loop_stats.tiles, loop_stats.average_word_length
                ));
            }
            ["save"] => {
                let path = config.snapshot_path();
                match save_snapshot(&board, &path) {
                    Ok(()) => messages.push(format!("Saved to '{}'", path.display())),
                    Err(e) => messages.push(format!("[ERROR] Could not save: {}", e)),
                }
            }
            ["load"] => {
                let path = config.snapshot_path();
                let dictionary: Dictionary = board.dictionary().clone();
                match load_snapshot(&path, dictionary, board.hint_config().clone()) {
                    Ok(restored) => {
                        board = restored;
                        messages.push(format!("Loaded '{}'", path.display()));
                    }
                    Err(e) => messages.push(format!("[ERROR] Could not load: {}", e)),
                }
            }
            _ => messages.push(format!("Unknown command: {}", input.trim())),
        }

        for event in board.drain_events() {
            messages.push(describe_event(&event));
        }
    }

    info!("Bye.");
}

fn describe_event(event: &BoardEvent) -> String {
    match event {
        BoardEvent::WordAttempted { word, is_word: false, .. } => format!("'{}' is not a word", word),
        BoardEvent::WordAttempted { word, merged: false, .. } => {
            format!("'{}' does not extend the perimeter", word)
        }
        BoardEvent::WordAttempted { word, closed: true, .. } => format!("'{}' closes the loop!", word),
        BoardEvent::WordAttempted { word, .. } => format!("'{}' added", word),
        BoardEvent::WordReverted { terminal } => match terminal {
            Some(t) => format!("Undone, back at {}", t),
            None => "Undone, perimeter empty".into(),
        },
        BoardEvent::HintResolved { words, reaches_end, .. } => format!(
            "Hint: {}{}",
            words.join(" -> "),
            if *reaches_end { "" } else { " (gets closer)" }
        ),
        BoardEvent::HintFailed => "No hint available.".into(),
    }
}

fn print_ui(board: &Board, messages: &[String]) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("Word Perimeter Simulator");
    println!("---------------------------------------------------------------");
    println!("tap X Y | end | undo | hint | reset | shuffle easier|harder");
    println!("stats | save | load | exit\n");

    let grid = &board.grid;
    for y in (0..grid.rows()).rev() {
        print!("{:>3} ", y);
        for x in 0..grid.cols() {
            let coord = Coord::new(x, y);
            let Some(letter) = grid.letter_at(coord) else {
                print!(" . ");
                continue;
            };
            let color = if board.perimeter.current().is_some_and(|s| s.contains(coord)) {
                Color::Yellow
            } else if board.perimeter.is_terminal(coord) {
                Color::Cyan
            } else if board.perimeter.is_verified(coord) {
                Color::Green
            } else {
                Color::Reset
            };
            execute!(out, SetForegroundColor(color), Print(format!(" {} ", letter.ch)), ResetColor)?;
        }
        println!();
    }
    print!("    ");
    for x in 0..grid.cols() {
        print!("{:>2} ", x);
    }
    println!("\n");

    let state = match board.perimeter.state() {
        PerimeterState::Empty => "empty",
        PerimeterState::Open => "open",
        PerimeterState::Closed => "closed",
    };
    println!("Perimeter ({}): {}", state, board.perimeter.describe());
    if let Some(selection) = board.perimeter.current() {
        println!("Tracing: [{}]", selection.to_text());
    }
    for message in messages {
        println!("{}", message);
    }
    print!("\n> ");
    out.flush()
}

mod config;

use clap::Parser;
use config::{ConsoleConfig, GameMode};
use tictactoe_engine::game::{CELL_COUNT, Mark, SessionPhase, SessionState};
use tictactoe_engine::id_generator::generate_participant_id;
use tictactoe_engine::service::SessionService;
use tictactoe_engine::{ParticipantId, log, logger};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser)]
#[command(name = "tictactoe_console")]
struct Args {
    #[arg(long, value_enum)]
    mode: Option<GameMode>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Console")
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager = config::get_config_manager();
    let mut console_config = config_manager.get_config().unwrap_or_else(|e| {
        log!("Failed to load console config, using defaults: {}", e);
        ConsoleConfig::default()
    });

    let participant_id = match console_config.participant_id.clone() {
        Some(id) => ParticipantId::new(id),
        None => {
            let id = generate_participant_id();
            console_config.participant_id = Some(id.clone());
            ParticipantId::new(id)
        }
    };

    let mode = args
        .mode
        .or(console_config.last_mode)
        .unwrap_or(GameMode::Engine);
    console_config.last_mode = Some(mode);

    if let Err(e) = config_manager.set_config(&console_config) {
        log!("Failed to save console config: {}", e);
    }

    log!("Starting console client as {}", participant_id);

    let service = SessionService::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match mode {
        GameMode::Engine => run_engine_game(&service, &participant_id, &mut lines).await?,
        GameMode::TwoPlayers => run_two_player_game(&service, &participant_id, &mut lines).await?,
    }

    Ok(())
}

async fn run_engine_game(
    service: &SessionService,
    participant: &ParticipantId,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = service.create_session(participant.clone(), None, true).await?;

    println!(
        "You play X, the engine plays O. Cells are numbered 0-8, left to right, top to bottom."
    );
    print_state(&handle.current_state().await);

    loop {
        let Some(cell_index) = prompt_cell(lines, "Your move:").await? else {
            println!("Game abandoned.");
            break;
        };

        match handle.accept_move(participant, cell_index).await {
            Ok(state) => {
                print_state(&state);
                if state.phase.is_terminal() {
                    print_result(state.phase);
                    break;
                }
            }
            Err(e) => println!("Move rejected: {}", e),
        }
    }

    service.remove_session(handle.id()).await;
    Ok(())
}

async fn run_two_player_game(
    service: &SessionService,
    participant: &ParticipantId,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut second_id = generate_participant_id();
    while second_id == participant.as_str() {
        second_id = generate_participant_id();
    }
    let second = ParticipantId::new(second_id);

    let handle = service
        .create_session(participant.clone(), Some(second.clone()), false)
        .await?;

    println!(
        "{} plays X, {} plays O. Cells are numbered 0-8, left to right, top to bottom.",
        participant, second
    );
    print_state(&handle.current_state().await);

    loop {
        let state = handle.current_state().await;
        let mover = match state.phase {
            SessionPhase::AwaitingMove(Mark::X) => participant,
            SessionPhase::AwaitingMove(Mark::O) => &second,
            _ => break,
        };

        let prompt = format!("{} to move:", mover);
        let Some(cell_index) = prompt_cell(lines, &prompt).await? else {
            println!("Game abandoned.");
            break;
        };

        match handle.accept_move(mover, cell_index).await {
            Ok(new_state) => {
                print_state(&new_state);
                if new_state.phase.is_terminal() {
                    print_result(new_state.phase);
                    break;
                }
            }
            Err(e) => println!("Move rejected: {}", e),
        }
    }

    service.remove_session(handle.id()).await;
    Ok(())
}

async fn prompt_cell(
    lines: &mut Lines<BufReader<Stdin>>,
    prompt: &str,
) -> std::io::Result<Option<usize>> {
    loop {
        println!("{}", prompt);
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        match parse_cell_input(&line) {
            CellInput::Cell(index) => return Ok(Some(index)),
            CellInput::Quit => return Ok(None),
            CellInput::Invalid => println!(
                "Enter a cell number between 0 and {}, or q to quit.",
                CELL_COUNT - 1
            ),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum CellInput {
    Cell(usize),
    Quit,
    Invalid,
}

fn parse_cell_input(input: &str) -> CellInput {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
        return CellInput::Quit;
    }
    match trimmed.parse::<usize>() {
        Ok(index) if index < CELL_COUNT => CellInput::Cell(index),
        _ => CellInput::Invalid,
    }
}

fn print_state(state: &SessionState) {
    println!("{}\n", state);
}

fn print_result(phase: SessionPhase) {
    match phase {
        SessionPhase::Won(mark) => println!("Game over: {} wins.", mark),
        SessionPhase::Draw => println!("Game over: draw."),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_input_accepts_digits_in_range() {
        assert_eq!(parse_cell_input("0"), CellInput::Cell(0));
        assert_eq!(parse_cell_input(" 8 "), CellInput::Cell(8));
    }

    #[test]
    fn test_parse_cell_input_recognizes_quit() {
        assert_eq!(parse_cell_input("q"), CellInput::Quit);
        assert_eq!(parse_cell_input("Q"), CellInput::Quit);
        assert_eq!(parse_cell_input("QUIT"), CellInput::Quit);
    }

    #[test]
    fn test_parse_cell_input_rejects_out_of_range_and_garbage() {
        assert_eq!(parse_cell_input("9"), CellInput::Invalid);
        assert_eq!(parse_cell_input("-1"), CellInput::Invalid);
        assert_eq!(parse_cell_input("center"), CellInput::Invalid);
        assert_eq!(parse_cell_input(""), CellInput::Invalid);
    }
}

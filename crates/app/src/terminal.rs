//! Terminal presentation adapter.
//!
//! Renders controller snapshots and feeds two event streams back into it:
//! one-second interval ticks for the countdown and stdin lines for the
//! player. Both arrive through one `select!`, so the controller only ever
//! sees discrete, ordered events.

use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Duration, MissedTickBehavior};

use services::{QuizController, QuizSnapshot};
use trivia_core::session::SessionPhase;

/// Runs one loaded quiz until it finishes or the player quits.
///
/// Returns `true` when the player asked for another round.
///
/// # Errors
///
/// Returns `io::Error` if stdin cannot be read.
pub async fn run_quiz(mut controller: QuizController) -> io::Result<bool> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; consume it so the
    // countdown loses its first second a full second after the question
    // is shown.
    ticker.tick().await;

    render_question(&controller.snapshot());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let was_awaiting = controller.phase() == SessionPhase::AwaitingAnswer;
                let snapshot = controller.tick();
                if was_awaiting {
                    match snapshot.phase {
                        SessionPhase::AwaitingAnswer => announce_time(&snapshot),
                        SessionPhase::Graded => {
                            println!("Time's up!");
                            render_grading(&snapshot);
                        }
                        SessionPhase::Idle | SessionPhase::Finished => {}
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(false);
                };
                match handle_line(&mut controller, line.trim()) {
                    LoopStep::Continue => {}
                    LoopStep::Quit => return Ok(false),
                    LoopStep::Restart => return Ok(true),
                }
            }
        }
    }
}

enum LoopStep {
    Continue,
    Quit,
    Restart,
}

fn handle_line(controller: &mut QuizController, input: &str) -> LoopStep {
    match controller.phase() {
        SessionPhase::AwaitingAnswer => {
            submit_choice(controller, input);
            LoopStep::Continue
        }
        SessionPhase::Graded => {
            let snapshot = controller.advance();
            match snapshot.phase {
                SessionPhase::AwaitingAnswer => render_question(&snapshot),
                SessionPhase::Finished => render_summary(&snapshot),
                SessionPhase::Idle | SessionPhase::Graded => {}
            }
            LoopStep::Continue
        }
        SessionPhase::Finished => {
            if input.eq_ignore_ascii_case("r") {
                LoopStep::Restart
            } else {
                LoopStep::Quit
            }
        }
        SessionPhase::Idle => LoopStep::Quit,
    }
}

fn submit_choice(controller: &mut QuizController, input: &str) {
    let choice_count = controller
        .snapshot()
        .question
        .map_or(0, |question| question.choices.len());

    let picked = input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=choice_count).contains(n))
        .and_then(|n| {
            controller
                .snapshot()
                .question
                .and_then(|question| question.choices.get(n - 1).cloned())
        });

    match picked {
        Some(choice) => {
            let snapshot = controller.submit_answer(&choice);
            render_grading(&snapshot);
        }
        None => println!("Pick a number between 1 and {choice_count}."),
    }
}

fn render_question(snapshot: &QuizSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };

    println!();
    println!(
        "Question {}/{} · {}",
        question.number, question.total, question.category
    );
    println!("{}", question.text);
    for (index, choice) in question.choices.iter().enumerate() {
        println!("  {}) {}", index + 1, choice);
    }
    println!(
        "{}s on the clock. Type a choice number and press Enter.",
        snapshot.remaining_seconds
    );
}

fn announce_time(snapshot: &QuizSnapshot) {
    let remaining = snapshot.remaining_seconds;
    if remaining % 10 == 0 || remaining <= 5 {
        println!("  {remaining}s left");
    }
}

fn render_grading(snapshot: &QuizSnapshot) {
    let Some(outcome) = &snapshot.last_outcome else {
        return;
    };

    if outcome.is_correct {
        println!("Correct! Score: {}", snapshot.score);
    } else {
        println!("The correct answer was: {}", outcome.correct_answer);
    }
    println!("Press Enter to continue.");
}

fn render_summary(snapshot: &QuizSnapshot) {
    let Some(summary) = snapshot.summary else {
        return;
    };

    println!();
    println!(
        "Quiz complete: {}/{} correct ({:.0}%).",
        summary.score(),
        summary.total(),
        summary.percentage()
    );
    println!("{}", summary.band().message());
    println!("Play again? [r] restarts with fresh questions, anything else quits.");
}

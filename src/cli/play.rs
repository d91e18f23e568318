//! Play, odds and sync commands

use anyhow::{bail, Result};

use expgacha::present::format_thousands;
use expgacha::{GameContext, RoundResult, SubmitOutcome};

/// Play `rounds` rounds back to back
pub async fn play_command(ctx: &GameContext, rounds: u32) -> Result<()> {
    if rounds == 0 {
        bail!("--rounds must be at least 1");
    }

    let orchestrator = ctx.orchestrator();
    for _ in 0..rounds {
        let result = orchestrator.play_round().await?;
        print_round(&result);
    }

    let record = orchestrator.best_record();
    println!();
    println!(
        "Best: {} after {} attempts",
        record.best_score,
        format_thousands(record.attempt_count)
    );
    Ok(())
}

fn print_round(result: &RoundResult) {
    let marker = if result.is_camera_effect { "!!" } else { "  " };
    println!(
        "{} #{:<6} {:>6}  (odds of higher: {})",
        marker,
        format_thousands(result.attempt_count),
        result.score,
        result.rarity_label
    );

    if let Some(achievement) = &result.achievement {
        println!("   Achievement unlocked: {}", achievement.display_name);
    }
    if result.is_best {
        println!("   New personal best!");
    }
    if !result.comment.is_empty() {
        println!("   {}", result.comment);
    }
    if result.should_celebrate {
        println!("   *** Congratulations! ***");
    }

    match result.submission {
        SubmitOutcome::NotAttempted => {}
        SubmitOutcome::Inserted => println!("   Added to the leaderboard."),
        SubmitOutcome::Updated => println!("   Leaderboard updated."),
        SubmitOutcome::KeptExisting => {
            println!("   The leaderboard already holds a higher score for you.")
        }
        SubmitOutcome::Failed => {
            println!("   Could not reach the leaderboard; your best is saved locally.")
        }
    }
}

/// Show the odds for `score`
pub fn odds_command(ctx: &GameContext, score: i64) -> Result<()> {
    if score < 1 {
        bail!("Scores start at 1");
    }

    let orchestrator = ctx.orchestrator();
    println!("Score {} (mean {})", score, ctx.config().game.mean);
    println!("  Odds of rolling higher: {}", orchestrator.rarity_label(score));
    println!(
        "  Odds of rolling exactly {}: 1 in {}",
        score,
        format_thousands(orchestrator.pinpoint_rarity(score))
    );
    Ok(())
}

/// Push the local best to the leaderboard again
pub async fn sync_command(ctx: &GameContext) -> Result<()> {
    let outcome = ctx.orchestrator().resync().await?;
    let message = match outcome {
        SubmitOutcome::NotAttempted => "Nothing to sync yet; play a round first.",
        SubmitOutcome::Inserted => "Added to the leaderboard.",
        SubmitOutcome::Updated => "Leaderboard updated.",
        SubmitOutcome::KeptExisting => "The leaderboard already holds a higher score for you.",
        SubmitOutcome::Failed => "Could not reach the leaderboard.",
    };
    println!("{}", message);
    Ok(())
}


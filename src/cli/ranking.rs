//! Leaderboard commands

use anyhow::Result;

use expgacha::leaderboard::Rank;
use expgacha::GameContext;

/// Show the top of the leaderboard plus this player's row
pub async fn ranking_command(ctx: &GameContext, limit: Option<usize>, json: bool) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config().game.ranking_limit).max(1);
    let orchestrator = ctx.orchestrator();
    let board = orchestrator.ranking_board(limit).await;

    if json {
        let output = serde_json::json!({
            "top": board.top,
            "mine": board.mine,
            "rank": board.rank.position(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if board.top.is_empty() {
        println!("The leaderboard is empty or unreachable.");
        return Ok(());
    }

    let token = orchestrator.identity().client_token;
    println!("Top {}:\n", board.top.len());
    let mut position = 0;
    let mut previous = None;
    for (i, entry) in board.top.iter().enumerate() {
        // Equal scores share a position
        if previous != Some(entry.score) {
            position = i + 1;
            previous = Some(entry.score);
        }
        let marker = if entry.client_token == token { ">" } else { " " };
        println!(
            "{} {:>3}. {:<20} {:>6}  ({})",
            marker,
            position,
            entry.username,
            entry.score,
            orchestrator.rarity_label(entry.score)
        );
    }

    if let Some(mine) = &board.mine {
        println!();
        println!("You: {} with {} ({})", board.rank, mine.score, mine.username);
        for line in orchestrator.entry_details(mine).lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

/// Show this player's rank
pub async fn rank_command(ctx: &GameContext) -> Result<()> {
    match ctx.orchestrator().get_my_rank().await {
        Rank::Ranked(position) => println!("You are #{} on the leaderboard.", position),
        Rank::Unranked => println!("You are not on the leaderboard yet."),
    }
    Ok(())
}

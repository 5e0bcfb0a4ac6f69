//! End-to-end pipeline runs against in-memory worksheets and a scripted
//! reasoning service.

use std::sync::Arc;

use sitetox_core::{
    CaseCatalog, EvaluationPipeline, GroupDisposition, LeaderboardEntry, RowId, SKIPPED_FEEDBACK,
    WINNER_FEEDBACK,
};
use sitetox_reasoning::fakes::ScriptedReasoner;
use sitetox_state::fakes::MemoryWorksheet;

const HEADER: [&str; 10] = [
    "Timestamp",
    "Team Name",
    "Microbial Specialty",
    "Reasoning for Bid",
    "Case Site Bidding On",
    "Evaluation Status",
    "Gemini Feedback",
    "Bid Quality",
    "Is Winning Bid",
    "Points Awarded",
];

const STATUS: usize = 6;
const FEEDBACK: usize = 7;
const QUALITY: usize = 8;
const WINNER: usize = 9;
const POINTS: usize = 10;

const SELECTION_NEEDLE: &str = "selecting the single best proposal";

/// (team, specialty, reasoning, case, feedback, points)
type Row<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str, &'a str);

fn bid_sheet(rows: &[Row<'_>]) -> Arc<MemoryWorksheet> {
    let mut grid: Vec<Vec<String>> = vec![HEADER.iter().map(|h| h.to_string()).collect()];
    for &(team, specialty, reasoning, case, feedback, points) in rows {
        grid.push(
            [
                "2024-03-01",
                team,
                specialty,
                reasoning,
                case,
                "",
                feedback,
                "",
                "",
                points,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        );
    }
    Arc::new(MemoryWorksheet::with_rows("Bids", grid))
}

fn evaluation_of(reasoning: &str) -> String {
    format!("Team's Reasoning Provided: \"{reasoning}")
}

fn pipeline(
    bids: &Arc<MemoryWorksheet>,
    board: &Arc<MemoryWorksheet>,
    reasoner: &Arc<ScriptedReasoner>,
) -> EvaluationPipeline {
    EvaluationPipeline::new(
        CaseCatalog::builtin(),
        reasoner.clone(),
        bids.clone(),
        board.clone(),
    )
}

fn result_cells(sheet: &MemoryWorksheet, row: usize) -> [String; 5] {
    [STATUS, FEEDBACK, QUALITY, WINNER, POINTS].map(|col| sheet.cell(row, col))
}

#[tokio::test(start_paused = true)]
async fn site_5_pools_two_candidates_and_awards_one_point() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "Aerate to suppress cyanobacteria.", "Site 5", "", ""),
        ("Team B", "heterotrophic", "Graze algal biomass.", "Site 5", "", ""),
        ("Team C", "anaerobic", "Ferment the bloom.", "Site 5", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .on(SELECTION_NEEDLE, "Proposal 1 is the most direct.\nWinning Proposal: 1")
            .on(
                evaluation_of("Aerate"),
                "Oxygenation limits bloom formation.\nBid Quality: Highly competitive",
            )
            .on(evaluation_of("Graze"), "Plausible but slow.\nBid Quality: Eligible")
            .on(evaluation_of("Ferment"), "Anaerobes do not fit a surface bloom.\nBid Quality: Unfunded"),
    );

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 4);
    let selection_prompt = &reasoner.prompts()[3];
    assert!(selection_prompt.contains("Proposal 1:\n  Team: Team A"));
    assert!(selection_prompt.contains("Proposal 2:\n  Team: Team B"));
    assert!(!selection_prompt.contains("Proposal 3:"));

    assert_eq!(
        result_cells(&bids, 2),
        ["Evaluated", WINNER_FEEDBACK, "Highly competitive", "Yes", "1"].map(String::from)
    );
    assert_eq!(
        result_cells(&bids, 3),
        ["Evaluated", "Plausible but slow.", "Eligible", "No", "0"].map(String::from)
    );
    assert_eq!(
        result_cells(&bids, 4),
        [
            "Evaluated",
            "Anaerobes do not fit a surface bloom.",
            "Unfunded",
            "No",
            "0"
        ]
        .map(String::from)
    );

    assert_eq!(report.pending, 3);
    assert_eq!(report.winners(), 1);
    match &report.groups[0].disposition {
        GroupDisposition::Judged {
            candidates, winner, ..
        } => {
            assert_eq!(*candidates, 2);
            assert_eq!(*winner, Some(RowId(2)));
        }
        other => panic!("unexpected disposition: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unknown_case_rows_are_skipped_without_calls() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "Anything.", "Site 9", "", ""),
        ("Team B", "anaerobic", "Anything else.", "Site 9", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(ScriptedReasoner::new());

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 0);
    for row in [2, 3] {
        assert_eq!(
            result_cells(&bids, row),
            ["Skipped", SKIPPED_FEEDBACK, "Error", "No", "0"].map(String::from)
        );
    }
    assert_eq!(report.skipped_groups(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_candidate_wins_without_comparison() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "Nitrify the ammonia.", "Site 6", "", ""),
        ("Team B", "photosynthetic", "Grow duckweed.", "Site 6", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .on(evaluation_of("Nitrify"), "Textbook approach.\nBid Quality: Eligible")
            .on(evaluation_of("Grow duckweed"), "Too slow.\nBid Quality: Unfunded"),
    );

    pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 2);
    assert!(reasoner
        .prompts()
        .iter()
        .all(|p| !p.contains(SELECTION_NEEDLE)));
    assert_eq!(
        result_cells(&bids, 2),
        ["Evaluated", WINNER_FEEDBACK, "Eligible", "Yes", "1"].map(String::from)
    );
    assert_eq!(bids.cell(3, POINTS), "0");
}

#[tokio::test(start_paused = true)]
async fn group_without_qualifying_bids_awards_nothing() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "Vague idea.", "Site 1", "", ""),
        ("Team B", "heterotrophic", "Another vague idea.", "Site 1", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .then("No mechanism.\nBid Quality: Unfunded")
            .then("Reply without a verdict."),
    );

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 2);
    assert_eq!(bids.cell(2, QUALITY), "Unfunded");
    assert_eq!(bids.cell(3, QUALITY), "Error");
    assert!(bids
        .cell(3, FEEDBACK)
        .starts_with("Parsing Error: Unexpected LLM response format.\nReply without a verdict."));
    assert_eq!(bids.cell(2, POINTS), "0");
    assert_eq!(bids.cell(3, POINTS), "0");
    assert_eq!(report.winners(), 0);
}

#[tokio::test(start_paused = true)]
async fn service_failure_only_affects_its_own_bid() {
    let bids = bid_sheet(&[
        ("Team A", "anaerobic", "Dechlorinate TCE.", "Site 4", "", ""),
        ("Team B", "aerobic", "Cometabolise TCE.", "Site 4", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .fail_on(evaluation_of("Dechlorinate"), "quota exceeded")
            .on(evaluation_of("Cometabolise"), "Works with methane.\nBid Quality: Eligible"),
    );

    pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(bids.cell(2, STATUS), "Evaluated");
    assert_eq!(bids.cell(2, QUALITY), "Error");
    assert!(bids.cell(2, FEEDBACK).contains("quota exceeded"));
    assert_eq!(bids.cell(3, WINNER), "Yes");
    assert_eq!(bids.cell(3, POINTS), "1");
}

#[tokio::test(start_paused = true)]
async fn failed_row_write_does_not_block_later_rows() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "First plan.", "Site 6", "", ""),
        ("Team B", "aerobic", "Second plan.", "Site 6", "", ""),
    ]);
    bids.fail_updates_on_row(2);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .then("Fine.\nBid Quality: Unfunded")
            .then("Better.\nBid Quality: Highly competitive"),
    );

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(bids.cell(2, STATUS), "");
    assert_eq!(bids.cell(3, WINNER), "Yes");
    assert_eq!(report.groups[0].failed_writes, vec![RowId(2)]);
    assert_eq!(report.failed_writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn unusable_comparison_leaves_group_without_winner() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "Plan A.", "Site 2", "", ""),
        ("Team B", "anaerobic", "Plan B.", "Site 2", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .on(SELECTION_NEEDLE, "Both are good.\nWinning Proposal: 7")
            .on(evaluation_of("Plan A"), "Good.\nBid Quality: Eligible")
            .on(evaluation_of("Plan B"), "Good.\nBid Quality: Highly competitive"),
    );

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 3);
    // Highly competitive candidates are listed before Eligible ones.
    assert!(reasoner.prompts()[2].contains("Proposal 1:\n  Team: Team B"));
    assert_eq!(bids.cell(2, WINNER), "No");
    assert_eq!(bids.cell(3, WINNER), "No");
    assert_eq!(report.groups[0].winner(), None);
}

#[tokio::test(start_paused = true)]
async fn points_per_group_never_exceed_one() {
    let bids = bid_sheet(&[
        ("Team A", "aerobic", "A1.", "Site 1", "", ""),
        ("Team B", "aerobic", "B1.", "Site 1", "", ""),
        ("Team A", "anaerobic", "A3.", "Site 3", "", ""),
        ("Team C", "anaerobic", "C3.", "Site 3", "", ""),
        ("Team A", "aerobic", "A9.", "Site 9", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .on(SELECTION_NEEDLE, "Second is stronger.\nWinning Proposal: 2")
            .on("Bid Quality: Unfunded", "Strong.\nBid Quality: Highly competitive"),
    );

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    let grid = bids.snapshot();
    for case in ["Site 1", "Site 3", "Site 9"] {
        let total: u32 = grid
            .iter()
            .skip(1)
            .filter(|cells| cells[4] == case)
            .map(|cells| cells[POINTS - 1].parse::<u32>().unwrap())
            .sum();
        assert!(total <= 1, "{case} awarded {total} points");
    }
    assert_eq!(report.winners(), 2);
    assert_eq!(
        report.leaderboard,
        Some(vec![
            LeaderboardEntry {
                team_name: "Team B".to_string(),
                points: 1
            },
            LeaderboardEntry {
                team_name: "Team C".to_string(),
                points: 1
            },
            LeaderboardEntry {
                team_name: "Team A".to_string(),
                points: 0
            },
        ])
    );
}

#[tokio::test(start_paused = true)]
async fn evaluated_rows_are_left_alone_but_counted() {
    let bids = bid_sheet(&[
        ("Team X", "aerobic", "Old plan.", "Site 1", "Already graded.", "1"),
        ("Team Y", "aerobic", "New plan.", "Site 1", "", ""),
    ]);
    let board = Arc::new(MemoryWorksheet::with_rows(
        "Leaderboard",
        [["stale", "99"], ["rows", "98"], ["here", "97"]],
    ));
    let reasoner = Arc::new(ScriptedReasoner::new().then("Weak.\nBid Quality: Unfunded"));

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 1);
    assert_eq!(report.pending, 1);
    assert_eq!(bids.cell(2, FEEDBACK), "Already graded.");
    assert_eq!(
        board.snapshot(),
        vec![
            vec!["Team Name", "Total Points"],
            vec!["Team X", "1"],
            vec!["Team Y", "0"],
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn no_pending_bids_still_rebuilds_leaderboard() {
    let bids = bid_sheet(&[("Team X", "aerobic", "Old plan.", "Site 1", "Done.", "2")]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(ScriptedReasoner::new());

    let report = pipeline(&bids, &board, &reasoner).run().await.unwrap();

    assert_eq!(reasoner.calls(), 0);
    assert!(report.groups.is_empty());
    assert_eq!(board.cell(2, 1), "Team X");
    assert_eq!(board.cell(2, 2), "2");
}

#[tokio::test(start_paused = true)]
async fn custom_catalog_replaces_builtin_sites() {
    let bids = bid_sheet(&[("Team A", "aerobic", "Oxidise it.", "Pond A", "", "")]);
    let board = Arc::new(MemoryWorksheet::new("Leaderboard"));
    let reasoner = Arc::new(ScriptedReasoner::new().then("Sound.\nBid Quality: Eligible"));
    let catalog = CaseCatalog::new().with_site("Pond A", "Eutrophic pond.");

    EvaluationPipeline::new(catalog, reasoner.clone(), bids.clone(), board.clone())
        .run()
        .await
        .unwrap();

    assert!(reasoner.prompts()[0].contains("Site Details: Eutrophic pond."));
    assert_eq!(bids.cell(2, WINNER), "Yes");
}

//! Prompt text for the two reasoning calls.
//!
//! Both prompts end by dictating the exact closing line the parser looks for,
//! so marker wording lives in [`crate::parser`] and is rendered from there.

use sitetox_state::BidRecord;

use crate::parser::{MarkerSet, WINNER_LABEL};

/// The four microbial specialties a team may commit to.
pub const SPECIALTIES: [&str; 4] = ["aerobic", "anaerobic", "photosynthetic", "heterotrophic"];

const SPECIALTY_RULE: &str = "Participants can describe how their chosen specialty will be \
    modified or who they could partner with for a different specialty, but they must choose one \
    of the four.";

/// Single-bid evaluation prompt.
pub fn evaluation_prompt<T: Copy>(
    case_description: &str,
    specialty: &str,
    reasoning: &str,
    markers: &MarkerSet<T>,
) -> String {
    let closing: Vec<&str> = markers.markers().collect();
    format!(
        "You are an environmental microbiology expert evaluating a remediation bid proposal.\n\
         Site Details: {case_description}\n\
         Bidding Team's Specialty: {specialty}\n\
         Team's Reasoning Provided: \"{reasoning}\"\n\
         The microbial specialty must be one of the following: {specialties}.\n\
         {SPECIALTY_RULE}\n\
         \n\
         Based *only* on the reasoning provided, evaluate if the proposed approach using \
         {specialty} microbes is technically sound for remediating the contamination described \
         in the 'Site Details'.\n\
         Provide a brief (1-2 sentence) explanation for your evaluation.\n\
         Conclude your entire response *strictly* with one of the following on a new line:\n\
         {closing}\n",
        specialties = SPECIALTIES.join(", "),
        closing = closing.join("\n"),
    )
}

/// Enumerate candidates as `Proposal n:` blocks, 1-based, in slice order.
pub fn proposal_listing(candidates: &[BidRecord]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, bid)| {
            format!(
                "Proposal {}:\n  Team: {}\n  Specialty: {}\n  Reasoning: \"{}\"\n",
                idx + 1,
                bid.team_name,
                bid.specialty,
                bid.reasoning
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comparison prompt over pooled candidates. No tier is shown, so the
/// service compares on reasoning alone.
pub fn selection_prompt(case_description: &str, candidates: &[BidRecord]) -> String {
    format!(
        "You are an environmental microbiology expert selecting the single best proposal to \
         remediate the following site: {case_description}. The following proposals have been \
         deemed either technically sound or potentially viable based on their reasoning.\n\
         The microbial specialty used must be one of the following: {specialties}. \
         {SPECIALTY_RULE}\n\
         \n\
         Compare these proposals based *only* on the convincingness, clarity, and potential \
         efficiency implied by their reasoning. Which proposal presents the strongest overall \
         case for this specific site?\n\
         \n\
         {listing}\n\
         Provide a brief (1 sentence) rationale for your choice.\n\
         Conclude your entire response *strictly* with the winning proposal number on a new \
         line, like this:\n\
         {WINNER_LABEL}: [Number]\n",
        specialties = SPECIALTIES.join(", "),
        listing = proposal_listing(candidates),
    )
}

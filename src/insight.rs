//! Collaborator call to the hosted text-generation service
//!
//! The classified state, the user's raw metrics, and their stated goal are
//! phrased into the Rhythm AI coach prompt; the service must answer with a
//! JSON object holding exactly the two required fields. Any transport or
//! decoding failure surfaces as one error the caller reports as a notice,
//! leaving the already-computed classification untouched.

use crate::data::RhythmMetrics;
use crate::states::RhythmState;
use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const GENERATION_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const API_KEY_VAR: &str = "GEMINI_API_KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ANALYSIS_CONTEXT: &str = "Context from Data Analysis: Screen time is the primary disruptor \
    to productivity, and prioritizing rest is the most effective way to sustain flow. The \
    intervention must be non-digital and human-centered.";

/// The two fields the generation service must return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Insight {
    pub insight: String,
    pub microbreak: String,
}

/// Build the coach prompt for the classified state.
pub fn build_prompt(state: RhythmState, metrics: &RhythmMetrics, goal: &str) -> String {
    let (productivity, screen_time, sleep) = state.profile();
    format!(
        "You are 'Rhythm AI', an empathetic, human-centered productivity coach. Your role is to \
         translate data patterns into personalized, non-technical advice for a user.\n\n\
         **User's Current State (Clustering Result):** {state}\n\
         **State Characteristics:** {productivity} Productivity, {screen_time} Screen Time, {sleep} Sleep.\n\
         **User's Today's Goal:** {goal}\n\
         **User's Metrics:** {screen} hours screen time, {sleep_h} hours sleep, {prod}% productivity.\n\n\
         {context}\n\n\
         **Your Task:**\n\
         1. **Insight:** Write a short, empathetic paragraph (max 3 sentences) acknowledging their \
         current state and explaining what it means for their goal in simple, human language. Use \
         the cluster label (e.g., 'Flow State') once.\n\
         2. **Microbreak:** Generate one personalized, non-digital microbreak (2-5 minutes) \
         specifically tailored to address the core need of their state, focusing on reflection, \
         breathing, or planning.\n\
         3. **Format:** Output the response in JSON format with two keys: 'insight' and 'microbreak'.",
        state = state.label(),
        productivity = productivity,
        screen_time = screen_time,
        sleep = sleep,
        goal = goal,
        screen = metrics.screen_time_hours,
        sleep_h = metrics.sleep_hours,
        prod = metrics.productivity_0_100,
        context = ANALYSIS_CONTEXT,
    )
}

/// Ask the generation service to phrase an insight and microbreak for the
/// classified state. Blocking, with a bounded timeout.
pub fn generate_insight(
    state: RhythmState,
    metrics: &RhythmMetrics,
    goal: &str,
) -> crate::Result<Insight> {
    let api_key = std::env::var(API_KEY_VAR)
        .with_context(|| format!("{} not set; cannot reach the insight service", API_KEY_VAR))?;

    let body = json!({
        "contents": [{ "parts": [{ "text": build_prompt(state, metrics, goal) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "insight": { "type": "STRING" },
                    "microbreak": { "type": "STRING" }
                },
                "required": ["insight", "microbreak"]
            }
        }
    });

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build insight service client")?;

    let response: GenerateResponse = client
        .post(format!("{}?key={}", GENERATION_ENDPOINT, api_key))
        .json(&body)
        .send()
        .context("insight request failed")?
        .error_for_status()
        .context("insight service returned an error status")?
        .json()
        .context("insight response was not valid JSON")?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| anyhow::anyhow!("insight response contained no candidates"))?;

    decode_insight(&text)
}

/// Decode the service's JSON payload; both keys are required.
pub fn decode_insight(text: &str) -> crate::Result<Insight> {
    serde_json::from_str(text).context("insight payload is missing required fields")
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

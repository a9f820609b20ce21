//! Structured-output shapes declared to the generation service.

use serde_json::{json, Value};

/// Shape of a content generation result.
pub fn content_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "contentParts": {
                "type": "ARRAY",
                "description": "An array of content parts for a multi-part format like a carousel or thread. Each part has a title and body.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "partNumber": { "type": "INTEGER", "description": "The sequential number of the part." },
                        "title": { "type": "STRING", "description": "A short, attention-grabbing title or hook for the part." },
                        "body": { "type": "STRING", "description": "The main value-driven content of the part." },
                        "highlight": { "type": "STRING", "description": "A key phrase from the body to highlight for emphasis." }
                    },
                    "required": ["partNumber", "title", "body"]
                }
            },
            "script": {
                "type": "STRING",
                "description": "The full text for a video script, including hook, body, and call-to-action."
            },
            "postBody": {
                "type": "STRING",
                "description": "The full text content for a single social media post."
            },
            "captions": {
                "type": "ARRAY",
                "description": "3 suggested viral captions for the post.",
                "items": { "type": "STRING" }
            },
            "hashtags": {
                "type": "ARRAY",
                "description": "15 relevant and trending hashtags.",
                "items": { "type": "STRING" }
            },
            "nextTopicSuggestion": {
                "type": "STRING",
                "description": "A suggestion for the next viral topic the user should post about."
            }
        },
        "required": ["captions", "hashtags", "nextTopicSuggestion"]
    })
}

/// Shape of a post analysis report.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "viralPotentialScore": {
                "type": "OBJECT",
                "properties": {
                    "score": { "type": "INTEGER", "description": "A score from 0-100 representing the viral potential." },
                    "justification": { "type": "STRING", "description": "A brief explanation for the score." }
                },
                "required": ["score", "justification"]
            },
            "hookAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "effectiveness": { "type": "STRING", "description": "Rating of the hook: Poor, Average, Good, or Excellent." },
                    "feedback": { "type": "STRING", "description": "Specific feedback on the hook." },
                    "suggestion": { "type": "STRING", "description": "An improved version of the hook." }
                },
                "required": ["effectiveness", "feedback", "suggestion"]
            },
            "contentBreakdown": {
                "type": "OBJECT",
                "properties": {
                    "storytelling": { "type": "STRING", "description": "Analysis of the storytelling arc." },
                    "valueProposition": { "type": "STRING", "description": "Analysis of the value delivered to the audience." },
                    "callToAction": { "type": "STRING", "description": "Analysis of the effectiveness of the call to action." }
                },
                "required": ["storytelling", "valueProposition", "callToAction"]
            },
            "audienceSentiment": {
                "type": "OBJECT",
                "properties": {
                    "summary": { "type": "STRING", "description": "A summary of the overall audience sentiment." },
                    "positive": { "type": "INTEGER", "description": "Percentage of positive sentiment." },
                    "neutral": { "type": "INTEGER", "description": "Percentage of neutral sentiment." },
                    "negative": { "type": "INTEGER", "description": "Percentage of negative sentiment." },
                    "questions": { "type": "INTEGER", "description": "Percentage of comments that are questions." }
                },
                "required": ["summary", "positive", "neutral", "negative", "questions"]
            },
            "growthOpportunities": {
                "type": "ARRAY",
                "description": "A list of 3-5 actionable growth opportunities based on the analysis.",
                "items": { "type": "STRING" }
            },
            "xFactor": {
                "type": "OBJECT",
                "properties": {
                    "identified": { "type": "BOOLEAN", "description": "Whether a unique \"X-Factor\" was identified." },
                    "description": { "type": "STRING", "description": "Description of the X-Factor that makes the content stand out." }
                },
                "required": ["identified", "description"]
            }
        },
        "required": [
            "viralPotentialScore",
            "hookAnalysis",
            "contentBreakdown",
            "audienceSentiment",
            "growthOpportunities",
            "xFactor"
        ]
    })
}

/// Shape of the hook optimisation result: four scored hooks.
pub fn optimization_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "partNumber": { "type": "INTEGER", "description": "Should always be 1." },
                "title": { "type": "STRING", "description": "The new hook title." },
                "body": { "type": "STRING", "description": "The new hook body text." },
                "viralScore": { "type": "INTEGER", "description": "A score from 0-100 for viral potential." },
                "rationale": { "type": "STRING", "description": "A brief explanation for the score and the psychological trigger used." }
            },
            "required": ["partNumber", "title", "body", "viralScore", "rationale"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_schema_requires_auxiliary_fields_only() {
        let schema = content_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert!(!required.contains(&json!("contentParts")));
    }

    #[test]
    fn test_optimization_schema_is_array() {
        assert_eq!(optimization_schema()["type"], "ARRAY");
    }

    #[test]
    fn test_analysis_schema_requires_every_section() {
        let schema = analysis_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 6);
    }
}

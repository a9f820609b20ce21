//! Prompt construction for the generation, analysis, optimisation and video requests.
//!
//! Everything here is a pure string transformation.

use std::collections::BTreeMap;

use crate::content::{playbook_or_default, ContentPart, Format, Playbook, UserInputs};

const PERSONA: &str = "You are ViralFlow, the most advanced AI-powered social media strategist and viral content creator. You are bold, creative, minimalistic, and 100% focused on creating content that goes viral.";

const JSON_ONLY: &str = "Please provide your response in a pure JSON format, adhering to the provided schema. Only populate the field relevant to the requested format ('contentParts', 'script', or 'postBody'). Do not include any introductory text, markdown formatting, or explanations outside of the JSON structure.";

/// Replace every `[KEY]` in `template` with the value for `KEY`.
///
/// Placeholders without an entry in `vars` are left untouched. Each key is
/// replaced in a single pass, so a value containing its own placeholder is
/// not expanded again.
pub fn substitute_placeholders(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("[{}]", key);
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, value);
        }
    }
    out
}

/// Fixed instruction block for the requested format.
pub fn format_instructions(format: Format, part_count: u32) -> String {
    match format {
        Format::Carousel | Format::Thread | Format::Story => format!(
            "Create the content for a {}-part {}.
Each part must have a title and body, following a story arc: Hook -> Value -> Engagement -> Call-to-Action.
The final part should always be an engagement-focused Call-to-Action.
Ensure the 'highlight' text is a short, impactful phrase taken directly from the 'body' of the same part.
Provide this content in the 'contentParts' array.",
            part_count, format
        ),
        Format::VideoScript => "Write a concise and engaging video script for a short-form video (like TikTok, Reels, or YouTube Shorts).
The script should have a strong hook, a value-packed body, and a clear call-to-action at the end.
The script should be formatted for easy reading.
Provide the entire script as a single string in the 'script' field."
            .to_string(),
        Format::Post => "Write a single, impactful social media post for the specified platform.
The post should be well-structured, provide value, and encourage engagement based on the user's goal.
Provide the entire post content as a single string in the 'postBody' field."
            .to_string(),
    }
}

/// Prompt used when the selected playbook has no creative brief.
pub fn build_standard_prompt(inputs: &UserInputs) -> String {
    let topic = inputs
        .playbook_inputs
        .get("topic")
        .map(String::as_str)
        .unwrap_or("");
    let part_line = if inputs.format.is_multi_part() {
        format!("\n- Number of Parts: {}", inputs.part_count)
    } else {
        String::new()
    };

    format!(
        "{persona}

Your task is to generate a viral social media post based on the following user requirements:
- Platform: {platform}
- Topic: \"{topic}\"
- Tone: {tone}
- Format: {format}
- Goal: {goal}{part_line}

{instructions}

In addition to the main content, also provide 3 viral captions, 15 relevant hashtags, and a suggestion for the next viral topic.

{json_only}",
        persona = PERSONA,
        platform = inputs.platform,
        topic = topic,
        tone = inputs.tone,
        format = inputs.format,
        goal = inputs.goal,
        part_line = part_line,
        instructions = format_instructions(inputs.format, inputs.part_count),
        json_only = JSON_ONLY,
    )
}

/// Prompt wrapping a playbook's creative brief.
pub fn build_playbook_prompt(inputs: &UserInputs, playbook: &Playbook) -> String {
    let brief = substitute_placeholders(playbook.template.unwrap_or(""), &inputs.playbook_inputs);

    format!(
        "{persona}

Your task is to execute the following creative brief with extreme expertise. After executing the brief, you must transform the output into a final, ready-to-post piece of content based on the user's desired format.

--- CREATIVE BRIEF ---
{brief}
--- END BRIEF ---

**Final Output Specifications:**
- Platform: {platform}
- Format: {format}
- Tone: {tone}
- Goal: {goal}

**Format-Specific Instructions:**
{instructions}

**Additional Requirements:**
In addition to the main content, you must also provide:
1.  3 viral captions for the post.
2.  15 relevant and trending hashtags.
3.  A suggestion for the next viral topic the user should post about.

{json_only}",
        persona = PERSONA,
        brief = brief,
        platform = inputs.platform,
        format = inputs.format,
        tone = inputs.tone,
        goal = inputs.goal,
        instructions = format_instructions(inputs.format, inputs.part_count),
        json_only = JSON_ONLY,
    )
}

/// Pick the playbook prompt when the selected playbook has a template,
/// otherwise the standard prompt.
pub fn build_generation_prompt(inputs: &UserInputs) -> String {
    let playbook = playbook_or_default(&inputs.playbook_id);
    if playbook.template.is_some() && playbook.id == inputs.playbook_id {
        build_playbook_prompt(inputs, playbook)
    } else {
        build_standard_prompt(inputs)
    }
}

pub fn build_analysis_prompt(url: &str) -> String {
    format!(
        "You are ViralFlow, the world's most advanced AI social media data analyst. You have deep expertise in marketing psychology, content strategy, and virality engineering. Your analysis is sharp, insightful, and always actionable.

Task: Analyze the social media post at the following URL and provide a comprehensive data-driven breakdown. Assume you can access and understand the content (video, images, text, comments) from the URL.
- Post URL: {url}

Provide a deep analysis covering the following areas:
1.  **Viral Potential Score:** An objective score (0-100) based on the hook, content quality, engagement potential, and shareability.
2.  **Hook Analysis:** Deconstruct the first 3 seconds or the main headline. Is it effective? Why? How could it be better?
3.  **Content Breakdown:** Analyze the core message, its structure, the value it provides, and the clarity of its call to action.
4.  **Audience Sentiment:** Based on the visible comments, categorize the general sentiment (Positive, Neutral, Negative, Questions).
5.  **Growth Opportunities:** Provide 3-5 concrete, actionable tips for the creator to improve this post or future content.
6.  **X-Factor:** Identify the single most unique or powerful element of this post that makes it stand out (or note its absence).

Please provide your response in a pure JSON format, adhering to the provided schema. Do not include any introductory text, markdown formatting, or explanations outside of the JSON structure.",
        url = url
    )
}

/// Prompt asking for three alternative hooks plus a re-score of the original.
pub fn build_optimization_prompt(hook: &ContentPart, inputs: &UserInputs) -> String {
    let topic = inputs
        .input("topic")
        .or_else(|| inputs.input("YOUR NICHE"))
        .unwrap_or("");

    format!(
        "You are ViralFlow's A/B Testing Specialist. Your sole purpose is to analyze a piece of content and generate superior, higher-performing alternatives based on proven marketing psychology. You are data-driven, creative, and concise.

Your task is to take an original social media hook (the first slide of a carousel) and create 3 powerful alternatives. Then, you must score all four versions (the original + your 3 new ones) on their viral potential.

**User's Goal for this Content:**
- Platform: {platform}
- Topic: \"{topic}\"
- Tone: {tone}
- Goal: {goal}

**Original Hook:**
- Title: \"{title}\"
- Body: \"{body}\"

**Instructions:**
1.  Generate 3 new, distinct versions of the hook. Each version should use a different psychological angle to grab attention. Examples of angles:
    - **Curiosity Gap:** Make the audience desperate to know the answer.
    - **Contrarian Take:** Challenge a popular belief.
    - **Pain Point Agitation:** Directly address a deep frustration of the target audience.
    - **Bold Promise:** Offer a highly desirable outcome.
    - **Social Proof:** Hint at a widely adopted secret or method.
2.  For each of the 4 hooks (the original + 3 new), provide:
    - A `viralScore` (an integer between 0 and 100) representing its likelihood to stop the scroll and compel engagement.
    - A brief `rationale` (max 20 words) explaining *why* it works and what psychological trigger it uses.
3.  Ensure the new `title` and `body` for each version are concise and impactful, suitable for a carousel cover. Maintain the original's core topic but reframe the angle.
4. The partNumber for all generated parts must be 1.
5. The very first item in the returned array must be the original hook, along with its new score and rationale.

Provide your response as a pure JSON array, adhering to the provided schema. Do not include any introductory text, markdown, or explanations.",
        platform = inputs.platform,
        topic = topic,
        tone = inputs.tone,
        goal = inputs.goal,
        title = hook.title,
        body = hook.body,
    )
}

pub fn build_video_prompt(script: &str) -> String {
    format!(
        "Create a short, dynamic, visually engaging video for social media (like TikTok or Instagram Reels) based on the following script. The style should be modern and fast-paced to keep viewers engaged. Use stock footage and abstract animations where appropriate. \n\nSCRIPT:\n{}",
        script
    )
}

//! System instruction assembly for the generation API

/// Instruction for text-only consultations
///
/// The patient text is embedded directly; the Gemini REST API takes the
/// whole thing as a single user part.
#[must_use]
pub fn text_instruction(question: &str) -> String {
    format!(
        "You are an empathetic, experienced medical professional. \
         The user is speaking in English. \
         Reply ONLY in English, naturally and conversationally. \
         Avoid bullet points, markdown symbols, or punctuation like * or -. \
         Be caring, clear, and concise like a real doctor.\n\n\
         Patient: {question}"
    )
}

/// Instruction for image consultations
///
/// Sent alongside the inline image part; any typed text from the same
/// turn is deliberately not included.
#[must_use]
pub fn image_instruction() -> &'static str {
    "You are an experienced and empathetic medical professional. \
     The user is speaking in English. \
     Analyze the uploaded image and respond conversationally in English. \
     Be natural, clear, and caring. \
     Avoid bullet points or markdown symbols."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_instruction_embeds_question() {
        let prompt = text_instruction("I have a headache");
        assert!(prompt.contains("Patient: I have a headache"));
        assert!(prompt.contains("medical professional"));
    }

    #[test]
    fn image_instruction_mentions_image() {
        assert!(image_instruction().contains("image"));
    }
}

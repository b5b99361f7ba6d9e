use crate::index::SearchMatch;

pub const SYSTEM_SHOPPING_ASSISTANT: &str = r#"You are a friendly shopping assistant. Your task is to recommend products based on the user's query and the search results provided. Be conversational, helpful, and suggest the most relevant products. Don't list all products unless necessary, focus on the best matches. If the query seems like a follow-up question, treat it as such and respond accordingly."#;

/// Reply when the index returns nothing.
pub const NO_RESULTS_MESSAGE: &str = "I couldn't find any products matching your query. Could you try describing what you're looking for differently?";

/// Reply when the chat model answers with no text.
pub const EMPTY_COMPLETION_MESSAGE: &str = "I found some products that might interest you!";

/// Numbered summary of each match, one block per product.
pub fn product_summaries(matches: &[SearchMatch]) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "Product {}: {}\nPrice: {}\nDescription: {}\nSimilarity Score: {:.2}",
                i + 1,
                m.metadata.name,
                m.metadata.price,
                m.metadata.description.as_deref().unwrap_or(""),
                m.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn recommendation_prompt(query: &str, matches: &[SearchMatch]) -> String {
    format!(
        r#"User query: "{}"

Available products:
{}

Please provide a friendly, conversational response recommending suitable products from this list. Don't list all products explicitly, just mention the best fits naturally in your response."#,
        query,
        product_summaries(matches)
    )
}

//! Prompt construction for SQL generation.

use super::chat::{ChatTemplate, Message};

const INSTRUCTIONS: &str = "\
Instructions:
- Make sure you only output the information that is asked in the question. If the question asks for a specific column, make sure to only include that column in the SELECT clause, nothing more.
- The generated query should return all of the information asked in the question without any missing or extra information.
- Before generating the final SQL query, please think through the steps of how to write the query. Do all the explanation before generating the final query.
- Make sure to check the datatypes of the columns. For Example: if Date column has text datatype, do not use date functions on it, use string functions.
- If the question has no relevance to the database provided, do not answer with any SQL query.

Take a deep breath and think step by step to find the correct SQL query.
";

/// User turn: task description, schema text, question, instructions.
pub fn build_prompt(schema: &str, question: &str) -> String {
    format!(
        "You are a data science expert. Below, you are provided with a database schema and a \
         natural language question. Your task is to understand the schema and generate a valid \
         PostgreSQL query to answer the question.\n\
         \n\
         Database Schema:\n\
         {schema}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         {INSTRUCTIONS}"
    )
}

/// Full model input: system turn + user turn, ready for generation.
pub fn render_conversation(
    template: ChatTemplate,
    system_prompt: &str,
    user_prompt: &str,
) -> String {
    let messages = [Message::system(system_prompt), Message::user(user_prompt)];
    template.render(&messages, true)
}

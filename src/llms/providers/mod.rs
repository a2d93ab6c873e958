//! LLM provider implementations.
//!
//! Each provider implements [`BaseLLM`](crate::llms::base_llm::BaseLLM).
//!
//! | Provider | Module |
//! |----------|--------|
//! | Google Gemini | [`gemini`] |
//! | Canned responses (tests) | `scripted` |

pub mod gemini;
#[cfg(test)]
pub mod scripted;

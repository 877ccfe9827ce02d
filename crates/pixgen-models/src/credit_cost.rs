//! Credit cost constants and helpers.
//!
//! One credit buys one generated image; training a personalization model
//! costs a flat amount. Costs are computed up front so the ledger can be
//! debited in a single atomic step per request.

/// Credit amounts are plain integers on the ledger.
pub type Credits = i64;

/// Cost of a single generated image.
pub const IMAGE_GEN_CREDITS: Credits = 1;

/// Cost of training a personalization model.
pub const TRAIN_MODEL_CREDITS: Credits = 20;

/// Total cost of a pack generation fanning out into `prompt_count` jobs.
pub fn pack_generation_cost(prompt_count: usize) -> Credits {
    IMAGE_GEN_CREDITS * prompt_count as Credits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_cost_scales_with_prompts() {
        assert_eq!(pack_generation_cost(0), 0);
        assert_eq!(pack_generation_cost(1), IMAGE_GEN_CREDITS);
        assert_eq!(pack_generation_cost(12), 12);
    }
}

use crate::models::{TierPalette, VisualTier, VisualWeight};

pub const BASE_SIZE_PIXELS: f64 = 15.0;
pub const SCALE_FACTOR: f64 = 2.0;

/// Ordered high to low; the first row whose minimum the count reaches wins.
/// `21` encodes "more than 20".
pub const TIER_TABLE: &[(usize, VisualTier)] = &[
    (200, VisualTier::Critical),
    (100, VisualTier::High),
    (21, VisualTier::Medium),
    (0, VisualTier::Low),
];

const CRITICAL_PALETTE: TierPalette = TierPalette {
    gradient_from: "#ef4444",
    gradient_to: "#b91c1c",
    solid: "#ef4444",
    shadow: "rgba(220, 38, 38, 0.6)",
};

const HIGH_PALETTE: TierPalette = TierPalette {
    gradient_from: "#f97316",
    gradient_to: "#c2410c",
    solid: "#f97316",
    shadow: "rgba(249, 115, 22, 0.6)",
};

const MEDIUM_PALETTE: TierPalette = TierPalette {
    gradient_from: "#3b82f6",
    gradient_to: "#4338ca",
    solid: "#3b82f6",
    shadow: "rgba(59, 130, 246, 0.6)",
};

const LOW_PALETTE: TierPalette = TierPalette {
    gradient_from: "#10b981",
    gradient_to: "#0f766e",
    solid: "#10b981",
    shadow: "rgba(16, 185, 129, 0.6)",
};

/// Marker font classes by minimum exclusive size.
const FONT_TABLE: &[(u32, &str)] = &[(35, "text-base"), (28, "text-xs")];
const FONT_DEFAULT: &str = "text-[10px]";

pub fn tier_for(count: usize) -> VisualTier {
    TIER_TABLE
        .iter()
        .find(|(minimum, _)| count >= *minimum)
        .map(|(_, tier)| *tier)
        .unwrap_or(VisualTier::Low)
}

pub fn palette_for(tier: VisualTier) -> TierPalette {
    match tier {
        VisualTier::Critical => CRITICAL_PALETTE,
        VisualTier::High => HIGH_PALETTE,
        VisualTier::Medium => MEDIUM_PALETTE,
        VisualTier::Low => LOW_PALETTE,
    }
}

pub fn size_for(count: usize) -> u32 {
    (BASE_SIZE_PIXELS + (count as f64).sqrt() * SCALE_FACTOR).round() as u32
}

fn font_for(size_pixels: u32) -> &'static str {
    FONT_TABLE
        .iter()
        .find(|(above, _)| size_pixels > *above)
        .map(|(_, class)| *class)
        .unwrap_or(FONT_DEFAULT)
}

pub fn resolve(count: usize) -> VisualWeight {
    let size_pixels = size_for(count);
    let tier = tier_for(count);
    VisualWeight {
        size_pixels,
        tier,
        palette: palette_for(tier),
        font_class: font_for(size_pixels),
        anchor_pixels: f64::from(size_pixels) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, size_for, tier_for};
    use crate::models::VisualTier;

    #[test]
    fn tier_boundaries_are_exact() {
        let cases = [
            (0, VisualTier::Low),
            (20, VisualTier::Low),
            (21, VisualTier::Medium),
            (99, VisualTier::Medium),
            (100, VisualTier::High),
            (199, VisualTier::High),
            (200, VisualTier::Critical),
            (5_000, VisualTier::Critical),
        ];
        for (count, tier) in cases {
            assert_eq!(tier_for(count), tier, "count {}", count);
        }
    }

    #[test]
    fn sizes_match_reference_points() {
        let expected = [(1, 17), (16, 23), (42, 28), (100, 35), (200, 43), (350, 52)];
        for (count, size) in expected {
            assert_eq!(size_for(count), size, "count {}", count);
        }
    }

    #[test]
    fn size_never_shrinks_as_count_grows() {
        let mut previous = 0;
        for count in 0..2_000 {
            let size = resolve(count).size_pixels;
            assert!(size >= previous);
            previous = size;
        }
    }

    #[test]
    fn palette_and_font_follow_tier_and_size() {
        let big = resolve(400);
        assert_eq!(big.palette.solid, "#ef4444");
        assert_eq!(big.palette.gradient_css(), "linear-gradient(135deg, #ef4444, #b91c1c)");
        assert_eq!(big.font_class, "text-base");
        assert_eq!(resolve(64).font_class, "text-xs");
        assert_eq!(resolve(3).font_class, "text-[10px]");
        assert_eq!(resolve(3).palette.shadow, "rgba(16, 185, 129, 0.6)");
        assert_eq!(resolve(16).anchor_pixels, 11.5);
    }
}

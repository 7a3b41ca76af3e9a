use bevy::color::{ColorToPacked, HexColorError};
use bevy::prelude::*;

/// Parameters the galaxy is generated from.
///
/// Edited by the control panel, read by the generator whenever a commit
/// event arrives.
#[derive(Resource, Clone, PartialEq, Debug)]
pub struct GalaxyParameters {
    pub count: i32,
    pub size: f32,
    pub radius: f32,
    pub branches: i32,
    pub spin: f32,
    /// Exposed in the panel but not part of the position formula.
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: Srgba,
    pub outside_color: Srgba,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: 100_000,
            size: 0.02,
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 3.0,
            inside_color: Srgba::rgb_u8(0xff, 0x60, 0x30),
            outside_color: Srgba::rgb_u8(0x57, 0x06, 0xd0),
        }
    }
}

impl GalaxyParameters {
    pub const MIN: Self = Self {
        count: 100,
        size: 0.001,
        radius: 0.01,
        branches: 2,
        spin: -5.0,
        randomness: 0.0,
        randomness_power: 1.0,
        inside_color: Srgba::BLACK,
        outside_color: Srgba::BLACK,
    };
    pub const MAX: Self = Self {
        count: 100_000,
        size: 0.1,
        radius: 20.0,
        branches: 20,
        spin: 5.0,
        randomness: 2.0,
        randomness_power: 10.0,
        inside_color: Srgba::WHITE,
        outside_color: Srgba::WHITE,
    };

    /// Copy of these parameters with every numeric field pulled into its
    /// declared range. Non-finite floats fall back to the default.
    pub fn clamped(&self) -> Self {
        let min = Self::MIN;
        let max = Self::MAX;
        let defaults = Self::default();

        let clamp_f32 = |value: f32, lo: f32, hi: f32, fallback: f32| {
            if value.is_finite() {
                value.clamp(lo, hi)
            } else {
                fallback
            }
        };

        Self {
            count: self.count.clamp(min.count, max.count),
            size: clamp_f32(self.size, min.size, max.size, defaults.size),
            radius: clamp_f32(self.radius, min.radius, max.radius, defaults.radius),
            branches: self.branches.clamp(min.branches, max.branches),
            spin: clamp_f32(self.spin, min.spin, max.spin, defaults.spin),
            randomness: clamp_f32(
                self.randomness,
                min.randomness,
                max.randomness,
                defaults.randomness,
            ),
            randomness_power: clamp_f32(
                self.randomness_power,
                min.randomness_power,
                max.randomness_power,
                defaults.randomness_power,
            ),
            inside_color: self.inside_color.with_alpha(1.0),
            outside_color: self.outside_color.with_alpha(1.0),
        }
    }

    pub fn color(&self, field: ColorField) -> Srgba {
        match field {
            ColorField::Inside => self.inside_color,
            ColorField::Outside => self.outside_color,
        }
    }

    pub fn color_mut(&mut self, field: ColorField) -> &mut Srgba {
        match field {
            ColorField::Inside => &mut self.inside_color,
            ColorField::Outside => &mut self.outside_color,
        }
    }

    /// Replaces one of the colours from a `#rrggbb` string and reports
    /// whether it differs from the previous one.
    /// On error the current colour is left untouched.
    pub fn set_color_hex(&mut self, field: ColorField, hex: &str) -> Result<bool, HexColorError> {
        let color = Srgba::hex(hex.trim())?.with_alpha(1.0);
        let current = self.color_mut(field);
        let changed = current.to_u8_array_no_alpha() != color.to_u8_array_no_alpha();
        *current = color;
        Ok(changed)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorField {
    Inside,
    Outside,
}

/// Names a single editable parameter, carried by commit events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ParameterField {
    Count,
    Size,
    Radius,
    Branches,
    Spin,
    Randomness,
    RandomnessPower,
    InsideColor,
    OutsideColor,
}

impl ParameterField {
    pub const ALL: [ParameterField; 9] = [
        ParameterField::Count,
        ParameterField::Size,
        ParameterField::Radius,
        ParameterField::Branches,
        ParameterField::Spin,
        ParameterField::Randomness,
        ParameterField::RandomnessPower,
        ParameterField::InsideColor,
        ParameterField::OutsideColor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ParameterField::Count => "count",
            ParameterField::Size => "size",
            ParameterField::Radius => "radius",
            ParameterField::Branches => "branches",
            ParameterField::Spin => "spin",
            ParameterField::Randomness => "randomness",
            ParameterField::RandomnessPower => "randomnessPower",
            ParameterField::InsideColor => "insideColor",
            ParameterField::OutsideColor => "outsideColor",
        }
    }

    /// Slider step for numeric fields.
    pub fn step(&self) -> Option<f64> {
        match self {
            ParameterField::Count => Some(1000.0),
            ParameterField::Size => Some(0.001),
            ParameterField::Radius => Some(0.01),
            ParameterField::Branches => Some(1.0),
            ParameterField::Spin => Some(0.001),
            ParameterField::Randomness => Some(0.001),
            ParameterField::RandomnessPower => Some(0.001),
            ParameterField::InsideColor | ParameterField::OutsideColor => None,
        }
    }
}

impl From<ColorField> for ParameterField {
    fn from(field: ColorField) -> Self {
        match field {
            ColorField::Inside => ParameterField::InsideColor,
            ColorField::Outside => ParameterField::OutsideColor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_range() {
        let params = GalaxyParameters::default();
        assert_eq!(params.clamped(), params);
    }

    #[test]
    fn test_clamped_pulls_into_range() {
        let params = GalaxyParameters {
            count: -5,
            size: 4.0,
            radius: -1.0,
            branches: 0,
            spin: f32::NAN,
            randomness: 9.0,
            randomness_power: 0.0,
            ..default()
        }
        .clamped();

        assert_eq!(params.count, GalaxyParameters::MIN.count);
        assert_eq!(params.size, GalaxyParameters::MAX.size);
        assert_eq!(params.radius, GalaxyParameters::MIN.radius);
        assert_eq!(params.branches, GalaxyParameters::MIN.branches);
        assert_eq!(params.spin, GalaxyParameters::default().spin);
        assert_eq!(params.randomness, GalaxyParameters::MAX.randomness);
        assert_eq!(params.randomness_power, GalaxyParameters::MIN.randomness_power);
    }

    #[test]
    fn test_default_colors_as_hex() {
        let params = GalaxyParameters::default();
        assert_eq!(params.inside_color.to_hex().to_lowercase(), "#ff6030");
        assert_eq!(params.outside_color.to_hex().to_lowercase(), "#5706d0");
    }

    #[test]
    fn test_set_color_hex() {
        let mut params = GalaxyParameters::default();
        let changed = params
            .set_color_hex(ColorField::Outside, "#1b3964")
            .expect("valid hex");
        assert!(changed);
        assert_eq!(params.outside_color, Srgba::rgb_u8(0x1b, 0x39, 0x64));

        // Same colour, different spelling.
        assert_eq!(params.set_color_hex(ColorField::Outside, " 1B3964 ").ok(), Some(false));
        let default_inside = params.inside_color.to_hex();
        assert_eq!(params.set_color_hex(ColorField::Inside, &default_inside).ok(), Some(false));

        let before = params.inside_color;
        assert!(params.set_color_hex(ColorField::Inside, "not a colour").is_err());
        assert_eq!(params.inside_color, before);
    }

    #[test]
    fn test_field_labels_unique() {
        let mut labels: Vec<_> = ParameterField::ALL.iter().map(|f| f.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), ParameterField::ALL.len());
    }
}

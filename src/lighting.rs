//! Scene lighting: a directional light whose colour comes from the flash
//! effect, and an optional attenuated point light.

use crate::flash::{FlashEffect, Trigger};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Attenuated point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// Attenuation factor at `distance`.
    pub fn attenuation(&self, distance: f32) -> f32 {
        let denom = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denom > 0.0 {
            1.0 / denom
        } else {
            0.0
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            constant: 1.0,
            linear: 7.1,
            quadratic: 14.2,
        }
    }
}

/// Lighting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Direction towards the directional light.
    pub direction: Vec3,
    pub ambient_enabled: bool,
    pub point_light_enabled: bool,
    pub point_light: PointLight,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 1.0, 1.0),
            ambient_enabled: true,
            point_light_enabled: true,
            point_light: PointLight::default(),
        }
    }
}

/// Resolved light values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    /// Unit direction towards the directional light.
    pub direction: Vec3,
    pub color: Vec3,
    /// `None` when the point light is switched off.
    pub point_light: Option<PointLight>,
}

/// User-toggled lighting state.
#[derive(Debug, Clone)]
pub struct SceneLighting {
    direction: Vec3,
    ambient_enabled: bool,
    point_light_enabled: bool,
    point_light: PointLight,
}

impl SceneLighting {
    pub fn new(settings: &LightingSettings) -> Self {
        Self {
            direction: settings.direction.try_normalize().unwrap_or(Vec3::Y),
            ambient_enabled: settings.ambient_enabled,
            point_light_enabled: settings.point_light_enabled,
            point_light: settings.point_light,
        }
    }

    /// Switch the directional light on or off. Returns the new state.
    pub fn toggle_ambient(&mut self) -> bool {
        self.ambient_enabled = !self.ambient_enabled;
        self.ambient_enabled
    }

    /// Switch the point light on or off. Returns the new state.
    pub fn toggle_point_light(&mut self) -> bool {
        self.point_light_enabled = !self.point_light_enabled;
        self.point_light_enabled
    }

    #[inline]
    pub fn ambient_enabled(&self) -> bool {
        self.ambient_enabled
    }

    #[inline]
    pub fn point_light_enabled(&self) -> bool {
        self.point_light_enabled
    }

    /// Combine the toggles with the flash colour.
    ///
    /// A flash lights the scene even when the directional light is off.
    pub fn resolve<T: Trigger>(&self, flash: &FlashEffect<T>) -> LightState {
        let color = if flash.is_active() || self.ambient_enabled {
            flash.light_color()
        } else {
            Vec3::ZERO
        };

        LightState {
            direction: self.direction,
            color,
            point_light: self.point_light_enabled.then_some(self.point_light),
        }
    }
}

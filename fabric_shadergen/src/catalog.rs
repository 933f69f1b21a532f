//! Built-in material types registered by [`TemplateRegistry::populated`].

use crate::registry::TemplateRegistry;
use crate::template::Template;
use crate::value::{DEFAULT_CUBE_MAP_ID, DEFAULT_IMAGE_ID, Record};

const BUMP_MAP: &str = include_str!("materials/bump_map.glsl");
const NORMAL_MAP: &str = include_str!("materials/normal_map.glsl");
const REFLECTION: &str = include_str!("materials/reflection.glsl");
const REFRACTION: &str = include_str!("materials/refraction.glsl");
const FRESNEL: &str = include_str!("materials/fresnel.glsl");
const STRIPE: &str = include_str!("materials/stripe.glsl");
const CHECKERBOARD: &str = include_str!("materials/checkerboard.glsl");
const DOT: &str = include_str!("materials/dot.glsl");

pub const COLOR: &str = "Color";
pub const IMAGE: &str = "Image";
pub const DIFFUSE_MAP: &str = "DiffuseMap";
pub const ALPHA_MAP: &str = "AlphaMap";
pub const SPECULAR_MAP: &str = "SpecularMap";
pub const EMISSION_MAP: &str = "EmissionMap";
pub const BUMP_MAP_TYPE: &str = "BumpMap";
pub const NORMAL_MAP_TYPE: &str = "NormalMap";
pub const REFLECTION_TYPE: &str = "Reflection";
pub const REFRACTION_TYPE: &str = "Refraction";
pub const FRESNEL_TYPE: &str = "Fresnel";
pub const STRIPE_TYPE: &str = "Stripe";
pub const CHECKERBOARD_TYPE: &str = "Checkerboard";
pub const DOT_TYPE: &str = "Dot";

pub const TYPES: [&str; 14] = [
    COLOR,
    IMAGE,
    DIFFUSE_MAP,
    ALPHA_MAP,
    SPECULAR_MAP,
    EMISSION_MAP,
    BUMP_MAP_TYPE,
    NORMAL_MAP_TYPE,
    REFLECTION_TYPE,
    REFRACTION_TYPE,
    FRESNEL_TYPE,
    STRIPE_TYPE,
    CHECKERBOARD_TYPE,
    DOT_TYPE,
];

fn color(red: f32, green: f32, blue: f32, alpha: f32) -> Record {
    Record::new()
        .with("red", red)
        .with("green", green)
        .with("blue", blue)
        .with("alpha", alpha)
}

fn repeat(x: f32, y: f32) -> Record {
    Record::new().with("x", x).with("y", y)
}

const SAMPLE_IMAGE: &str = "texture2D(image, fract(repeat * materialInput.st))";

fn image_map(kind: &str, channels: (&str, &str), component: &str) -> Template {
    let (channel_name, selector) = channels;
    Template::new()
        .with_type(kind)
        .with_uniform("image", DEFAULT_IMAGE_ID)
        .with_uniform(channel_name, selector)
        .with_uniform("repeat", repeat(1.0, 1.0))
        .with_component(component, format!("{SAMPLE_IMAGE}.{channel_name}"))
}

pub fn template(kind: &str) -> Option<Template> {
    let template = match kind {
        COLOR => Template::new()
            .with_type(COLOR)
            .with_uniform("color", color(1.0, 0.0, 0.0, 0.5))
            .with_component("diffuse", "color.rgb")
            .with_component("alpha", "color.a"),
        IMAGE => Template::new()
            .with_type(IMAGE)
            .with_uniform("image", DEFAULT_IMAGE_ID)
            .with_uniform("repeat", repeat(1.0, 1.0))
            .with_uniform("color", color(1.0, 1.0, 1.0, 1.0))
            .with_component("diffuse", format!("{SAMPLE_IMAGE}.rgb * color.rgb"))
            .with_component("alpha", format!("{SAMPLE_IMAGE}.a * color.a")),
        DIFFUSE_MAP => image_map(DIFFUSE_MAP, ("channels", "rgb"), "diffuse"),
        ALPHA_MAP => image_map(ALPHA_MAP, ("channel", "a"), "alpha"),
        SPECULAR_MAP => image_map(SPECULAR_MAP, ("channel", "r"), "specular"),
        EMISSION_MAP => image_map(EMISSION_MAP, ("channels", "rgb"), "emission"),
        BUMP_MAP_TYPE => Template::new()
            .with_type(BUMP_MAP_TYPE)
            .with_uniform("image", DEFAULT_IMAGE_ID)
            .with_uniform("channel", "r")
            .with_uniform("strength", 0.8)
            .with_uniform("repeat", repeat(1.0, 1.0))
            .with_source(BUMP_MAP),
        NORMAL_MAP_TYPE => Template::new()
            .with_type(NORMAL_MAP_TYPE)
            .with_uniform("image", DEFAULT_IMAGE_ID)
            .with_uniform("channels", "rgb")
            .with_uniform("strength", 0.8)
            .with_uniform("repeat", repeat(1.0, 1.0))
            .with_source(NORMAL_MAP),
        REFLECTION_TYPE => Template::new()
            .with_type(REFLECTION_TYPE)
            .with_uniform("cubeMap", DEFAULT_CUBE_MAP_ID)
            .with_uniform("channels", "rgb")
            .with_source(REFLECTION),
        REFRACTION_TYPE => Template::new()
            .with_type(REFRACTION_TYPE)
            .with_uniform("cubeMap", DEFAULT_CUBE_MAP_ID)
            .with_uniform("channels", "rgb")
            .with_uniform("indexOfRefractionRatio", 0.9)
            .with_source(REFRACTION),
        FRESNEL_TYPE => Template::new()
            .with_type(FRESNEL_TYPE)
            .with_material("reflection", Template::new().with_type(REFLECTION_TYPE))
            .with_material("refraction", Template::new().with_type(REFRACTION_TYPE))
            .with_source(FRESNEL),
        STRIPE_TYPE => Template::new()
            .with_type(STRIPE_TYPE)
            .with_uniform("horizontal", true)
            .with_uniform("evenColor", color(1.0, 1.0, 1.0, 0.5))
            .with_uniform("oddColor", color(0.0, 0.0, 1.0, 0.5))
            .with_uniform("offset", 0.0)
            .with_uniform("repeat", 5.0)
            .with_source(STRIPE),
        CHECKERBOARD_TYPE => Template::new()
            .with_type(CHECKERBOARD_TYPE)
            .with_uniform("lightColor", color(1.0, 1.0, 1.0, 0.5))
            .with_uniform("darkColor", color(0.0, 0.0, 0.0, 0.5))
            .with_uniform("repeat", repeat(5.0, 5.0))
            .with_source(CHECKERBOARD),
        DOT_TYPE => Template::new()
            .with_type(DOT_TYPE)
            .with_uniform("lightColor", color(1.0, 1.0, 0.0, 0.75))
            .with_uniform("darkColor", color(0.0, 1.0, 1.0, 0.75))
            .with_uniform("repeat", repeat(5.0, 5.0))
            .with_source(DOT),
        _ => return None,
    };
    Some(template)
}

pub(crate) fn populate(registry: &TemplateRegistry) {
    for kind in TYPES {
        if let Some(template) = template(kind) {
            registry.register(kind, template);
        }
    }
}

//! glTF material ingestion.
//!
//! Maps a parsed [`gltf_dep::Material`] view onto a
//! [`MaterialDescriptor`]. Document parsing, buffer resolution, and image
//! decoding stay with the host; this adapter only translates the material
//! fields, including the `KHR_materials_pbrSpecularGlossiness` and
//! `KHR_texture_transform` extensions.
//!
//! A material carrying the specular-glossiness extension maps to
//! [`PbrWorkflow::SpecularGlossiness`]; every other material maps to
//! [`PbrWorkflow::MetallicRoughness`] (the glTF core model applies its
//! defaults when the `pbrMetallicRoughness` object is omitted).

use crate::material::{
    AlphaMode, MaterialDescriptor, MetallicRoughness, PbrWorkflow, SpecularGlossiness,
    TextureReference, UvTransform,
};

/// Build a [`MaterialDescriptor`] from a parsed glTF material.
pub fn from_gltf(material: &gltf_dep::Material<'_>) -> MaterialDescriptor {
    let workflow = if let Some(sg) = material.pbr_specular_glossiness() {
        PbrWorkflow::SpecularGlossiness(SpecularGlossiness {
            diffuse_factor: sg.diffuse_factor(),
            diffuse_texture: sg.diffuse_texture().map(|t| texture_reference(&t)),
            specular_factor: sg.specular_factor(),
            glossiness_factor: sg.glossiness_factor(),
            specular_glossiness_texture: sg
                .specular_glossiness_texture()
                .map(|t| texture_reference(&t)),
        })
    } else {
        let pbr = material.pbr_metallic_roughness();
        PbrWorkflow::MetallicRoughness(MetallicRoughness {
            base_color_factor: pbr.base_color_factor(),
            base_color_texture: pbr.base_color_texture().map(|t| texture_reference(&t)),
            metallic_factor: pbr.metallic_factor(),
            roughness_factor: pbr.roughness_factor(),
            metallic_roughness_texture: pbr
                .metallic_roughness_texture()
                .map(|t| texture_reference(&t)),
        })
    };

    MaterialDescriptor {
        name: material.name().map(String::from),
        workflow: Some(workflow),
        normal_texture: material.normal_texture().map(|t| TextureReference {
            index: Some(t.texture().index()),
            uv_channel: t.tex_coord(),
            scale: t.scale(),
            transform: None,
        }),
        occlusion_texture: material.occlusion_texture().map(|t| TextureReference {
            index: Some(t.texture().index()),
            uv_channel: t.tex_coord(),
            scale: t.strength(),
            transform: None,
        }),
        emissive_texture: material.emissive_texture().map(|t| texture_reference(&t)),
        emissive_factor: material.emissive_factor(),
        alpha_mode: match material.alpha_mode() {
            gltf_dep::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf_dep::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf_dep::material::AlphaMode::Blend => AlphaMode::Blend,
        },
        alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
        double_sided: material.double_sided(),
    }
}

fn texture_reference(info: &gltf_dep::texture::Info<'_>) -> TextureReference {
    TextureReference {
        index: Some(info.texture().index()),
        uv_channel: info.tex_coord(),
        scale: 1.0,
        transform: info.texture_transform().map(|t| UvTransform {
            offset: t.offset(),
            rotation: t.rotation(),
            scale: t.scale(),
            uv_channel: t.tex_coord(),
        }),
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! Cameras and their formats are discovered through `pw-cli`. When the tool
//! is missing, PipeWire's default camera is offered instead.

use super::super::types::{CameraDevice, CameraFormat, DeviceInfo, Framerate};
use crate::constants::formats;
use tracing::{debug, info, warn};

/// Enumerate cameras using PipeWire
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    if !is_pipewire_available() {
        debug!("pipewiresrc not available");
        return None;
    }

    let cameras = run_pw_cli(&["ls", "Node"])
        .map(|stdout| parse_pw_cli_nodes(&stdout))
        .filter(|cams| !cams.is_empty());

    if let Some(cams) = cameras {
        debug!(count = cams.len(), "Found PipeWire cameras");
        return Some(cams);
    }

    info!("Using PipeWire auto-selection (default camera)");
    Some(vec![CameraDevice::pipewire_default()])
}

fn run_pw_cli(args: &[&str]) -> Option<String> {
    let output = std::process::Command::new("pw-cli")
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        debug!(?args, "pw-cli command failed");
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Node properties collected while walking `pw-cli ls Node` output
#[derive(Default)]
struct NodeProps {
    id: Option<String>,
    serial: Option<String>,
    description: Option<String>,
    nick: Option<String>,
    object_path: Option<String>,
    is_video_source: bool,
}

impl NodeProps {
    fn into_camera(self) -> Option<CameraDevice> {
        if !self.is_video_source {
            return None;
        }
        let id = self.id?;
        let name = self.description?;

        let path = match &self.serial {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", id),
        };

        let device_info = self
            .object_path
            .as_deref()
            .and_then(|p| p.strip_prefix("v4l2:"))
            .map(|v4l2_path| DeviceInfo {
                card: self.nick.clone().unwrap_or_default(),
                path: v4l2_path.to_string(),
            });

        debug!(id = %id, name = %name, path = %path, "Found video camera");
        Some(CameraDevice {
            name,
            path,
            metadata_path: Some(id),
            device_info,
        })
    }
}

/// Parse the output of `pw-cli ls Node` into video source devices
pub fn parse_pw_cli_nodes(stdout: &str) -> Vec<CameraDevice> {
    let mut cameras = Vec::new();
    let mut current = NodeProps::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // "id 76, type PipeWire:Interface:Node/3"
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            cameras.extend(std::mem::take(&mut current).into_camera());
            current.id = trimmed
                .strip_prefix("id ")
                .and_then(|rest| rest.split(',').next())
                .map(|id| id.trim().to_string());
            continue;
        }

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            current.is_video_source = true;
        } else if trimmed.contains("object.serial") {
            current.serial = extract_quoted_value(trimmed);
        } else if trimmed.contains("object.path") {
            current.object_path = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.nick") {
            current.nick = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.description") {
            current.description = extract_quoted_value(trimmed);
        }
    }
    cameras.extend(current.into_camera());

    cameras
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Get supported formats for a PipeWire camera
pub fn get_pipewire_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    if let Some(node_id) = device.metadata_path.as_deref() {
        match run_pw_cli(&["enum-params", node_id, "EnumFormat"])
            .map(|stdout| parse_enum_formats(&stdout))
            .filter(|formats| !formats.is_empty())
        {
            Some(formats) => {
                info!(count = formats.len(), node_id = %node_id, "Enumerated formats via pw-cli");
                return formats;
            }
            None => warn!(node_id = %node_id, "Failed to enumerate formats from node, using fallback"),
        }
    }

    fallback_formats()
}

/// Formats offered when PipeWire cannot be queried
pub fn fallback_formats() -> Vec<CameraFormat> {
    formats::FALLBACK_RESOLUTIONS
        .iter()
        .flat_map(|&(width, height)| {
            formats::COMMON_FRAMERATES.iter().map(move |&fps| CameraFormat {
                width,
                height,
                framerate: Some(Framerate::from_int(fps)),
                pixel_format: "MJPG".to_string(),
            })
        })
        .collect()
}

#[derive(Default)]
struct FormatGroup {
    width: Option<u32>,
    height: Option<u32>,
    framerates: Vec<Framerate>,
    subtype: Option<String>,
    video_format: Option<String>,
}

impl FormatGroup {
    fn flush_into(self, formats: &mut Vec<CameraFormat>) {
        let (Some(width), Some(height), Some(subtype)) = (self.width, self.height, self.subtype)
        else {
            return;
        };

        // Raw formats are named by VideoFormat, compressed ones by MediaSubtype
        let pixel_format = if subtype == "raw" {
            self.video_format.unwrap_or_else(|| "YUY2".to_string())
        } else {
            subtype.to_uppercase()
        };

        // libcamera nodes expose no framerates in EnumFormat
        if self.framerates.is_empty() {
            formats.push(CameraFormat {
                width,
                height,
                framerate: None,
                pixel_format,
            });
            return;
        }

        for fps in self.framerates {
            formats.push(CameraFormat {
                width,
                height,
                framerate: Some(fps),
                pixel_format: pixel_format.clone(),
            });
        }
    }
}

/// Parse the output of `pw-cli enum-params <node> EnumFormat`
pub fn parse_enum_formats(stdout: &str) -> Vec<CameraFormat> {
    let mut formats = Vec::new();
    let mut group = FormatGroup::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("Object:") {
            std::mem::take(&mut group).flush_into(&mut formats);
            continue;
        }

        // Id 131074   (Spa:Enum:MediaSubtype:mjpg)
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(pos) = trimmed.rfind(':')
        {
            group.subtype = Some(trimmed[pos + 1..].trim_end_matches(')').to_lowercase());
        }

        // Id 4   (Spa:Enum:VideoFormat:YUY2)
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(pos) = trimmed.rfind(':')
        {
            group.video_format = Some(trimmed[pos + 1..].trim_end_matches(')').to_uppercase());
        }

        // Rectangle 1920x1080
        if let Some(res) = trimmed.strip_prefix("Rectangle ")
            && let Some((w, h)) = res.split_once('x')
        {
            group.width = w.trim().parse().ok();
            group.height = h.trim().parse().ok();
        }

        // Fraction 60000/1001
        if let Some(frac) = trimmed.strip_prefix("Fraction ")
            && let Some((num, denom)) = frac.split_once('/')
            && let (Ok(num), Ok(denom)) = (num.trim().parse::<u32>(), denom.trim().parse::<u32>())
            && denom > 0
        {
            let fps = Framerate::new(num, denom);
            if !group.framerates.iter().any(|f| f.as_int() == fps.as_int()) {
                group.framerates.push(fps);
            }
        }
    }
    group.flush_into(&mut formats);

    formats
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }
    gstreamer::ElementFactory::find("pipewiresrc").is_some()
}

// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! Cameras and their formats are discovered through `pw-cli`. Parsing is kept
//! separate from the command invocation so it can be tested on captured output.

use super::super::types::{CameraDevice, CameraFormat, Framerate};
use tracing::{debug, info, warn};

/// Enumerate cameras using PipeWire
///
/// Returns `None` when PipeWire itself is unavailable. When PipeWire works but
/// `pw-cli` yields nothing, a single auto-select device is returned.
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    if !is_pipewire_available() {
        debug!("pipewiresrc not available");
        return None;
    }

    if let Some(stdout) = run_pw_cli(&["ls", "Node"]) {
        let mut cameras = parse_node_list(&stdout);
        if !cameras.is_empty() {
            for camera in &mut cameras {
                if let Some(id) = camera.node_id.clone() {
                    camera.location = query_node_location(&id);
                }
            }
            debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
            return Some(cameras);
        }
    }

    info!("Using PipeWire auto-selection (default camera)");
    Some(vec![CameraDevice {
        name: "Default Camera (PipeWire)".to_string(),
        path: String::new(),
        node_id: None,
        location: None,
    }])
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

/// Parse `pw-cli ls Node` output into video source devices
pub(crate) fn parse_node_list(stdout: &str) -> Vec<CameraDevice> {
    #[derive(Default)]
    struct Node {
        id: Option<String>,
        serial: Option<String>,
        name: Option<String>,
        is_video_source: bool,
    }

    fn finish(node: &Node, cameras: &mut Vec<CameraDevice>) {
        if !node.is_video_source {
            return;
        }
        let (Some(id), Some(name)) = (node.id.as_ref(), node.name.as_ref()) else {
            return;
        };
        // Prefer object.serial for target-object, fall back to node ID
        let path = match node.serial.as_ref() {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", id),
        };
        debug!(id = %id, name = %name, path = %path, "Found video camera");
        cameras.push(CameraDevice {
            name: name.clone(),
            path,
            node_id: Some(id.clone()),
            location: None,
        });
    }

    let mut cameras = Vec::new();
    let mut node = Node::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // "id 76, type PipeWire:Interface:Node/3"
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            finish(&node, &mut cameras);
            node = Node::default();
            node.id = trimmed
                .strip_prefix("id ")
                .and_then(|rest| rest.split(',').next())
                .map(|id| id.trim().to_string());
            continue;
        }

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            node.is_video_source = true;
        } else if trimmed.contains("object.serial") {
            node.serial = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.description") {
            node.name = extract_quoted_value(trimmed);
        }
    }
    finish(&node, &mut cameras);

    cameras
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Mounting location for a node (`pw-cli ls` does not include it)
fn query_node_location(node_id: &str) -> Option<String> {
    let stdout = run_pw_cli(&["info", node_id])?;
    parse_location(&stdout)
}

/// Find `api.libcamera.location = "front"` in `pw-cli info` output
pub(crate) fn parse_location(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.contains("api.libcamera.location"))
        .and_then(extract_quoted_value)
        .map(|value| value.to_lowercase())
}

/// Get supported formats for a PipeWire camera
///
/// An empty list means the formats are unknown and PipeWire should negotiate.
pub fn get_pipewire_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    let Some(node_id) = device.node_id.as_deref() else {
        warn!(path = %device.path, "No node ID for format enumeration");
        return Vec::new();
    };

    match run_pw_cli(&["enum-params", node_id, "EnumFormat"]) {
        Some(stdout) => {
            let formats = parse_enum_formats(&stdout);
            info!(count = formats.len(), node_id, "Enumerated formats via pw-cli");
            formats
        }
        None => {
            warn!(node_id, "Failed to enumerate formats from node");
            Vec::new()
        }
    }
}

/// Parse `pw-cli enum-params <id> EnumFormat` output
pub(crate) fn parse_enum_formats(stdout: &str) -> Vec<CameraFormat> {
    #[derive(Default)]
    struct Group {
        width: Option<u32>,
        height: Option<u32>,
        framerates: Vec<Framerate>,
        subtype: Option<String>,
        video_format: Option<String>,
    }

    fn flush(group: &mut Group, formats: &mut Vec<CameraFormat>) {
        if let (Some(width), Some(height), Some(subtype)) =
            (group.width, group.height, group.subtype.as_ref())
        {
            // Raw formats are named by VideoFormat, compressed ones by subtype
            let pixel_format = if subtype == "raw" {
                group
                    .video_format
                    .clone()
                    .unwrap_or_else(|| "YUY2".to_string())
            } else {
                subtype.to_uppercase()
            };

            if group.framerates.is_empty() {
                // libcamera negotiates framerate itself
                formats.push(CameraFormat {
                    width,
                    height,
                    framerate: None,
                    pixel_format,
                });
            } else {
                for fps in &group.framerates {
                    formats.push(CameraFormat {
                        width,
                        height,
                        framerate: Some(*fps),
                        pixel_format: pixel_format.clone(),
                    });
                }
            }
        }
        *group = Group::default();
    }

    let mut formats = Vec::new();
    let mut group = Group::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("Object:") {
            flush(&mut group, &mut formats);
            continue;
        }

        // Id 131074   (Spa:Enum:MediaSubtype:mjpg)
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(start) = trimmed.rfind(':')
        {
            group.subtype = Some(trimmed[start + 1..].trim_end_matches(')').to_lowercase());
        }

        // Id 4   (Spa:Enum:VideoFormat:YUY2)
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(start) = trimmed.rfind(':')
        {
            group.video_format = Some(trimmed[start + 1..].trim_end_matches(')').to_uppercase());
        }

        // Rectangle 1920x1080
        if let Some(res) = trimmed.strip_prefix("Rectangle ")
            && let Some((w, h)) = res.split_once('x')
        {
            group.width = w.trim().parse().ok();
            group.height = h.trim().parse().ok();
        }

        // Fraction 30/1
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
    flush(&mut group, &mut formats);

    formats
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }

    gstreamer::ElementFactory::find("pipewiresrc").is_some()
}

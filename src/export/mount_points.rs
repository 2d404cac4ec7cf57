//! `<MountPoints>` fragment.

use crate::mount_points::MountPoint;
use crate::xml::{Document, NodeId};

/// Format a coordinate with two decimals, never as `-0.00`.
pub fn format_coordinate(value: f32) -> String {
    let formatted = format!("{:.2}", value);
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

/// Append one `<MountPoint>` per entry to `parent`.
pub(crate) fn append_mount_points(doc: &mut Document, parent: NodeId, mount_points: &[MountPoint]) {
    for mp in mount_points {
        let element = doc.create_element("MountPoint");
        doc.set_attribute(element, "Side", mp.side.name());
        doc.set_attribute(element, "StartX", format_coordinate(mp.start.x));
        doc.set_attribute(element, "StartY", format_coordinate(mp.start.y));
        doc.set_attribute(element, "EndX", format_coordinate(mp.end.x));
        doc.set_attribute(element, "EndY", format_coordinate(mp.end.y));
        doc.append_child(parent, element);
    }
}

/// Build a `<MountPoints>` document.
pub fn mount_points_xml(mount_points: &[MountPoint]) -> Document {
    let mut doc = Document::new("MountPoints");
    let root = doc.root();
    append_mount_points(&mut doc, root, mount_points);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount_points::project_polygon;
    use crate::types::{block_bounds, BlockConfig, BlockSize, Side};
    use glam::{Vec2, Vec3};

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(0.5), "0.50");
        assert_eq!(format_coordinate(1.0 / 3.0), "0.33");
        assert_eq!(format_coordinate(-0.0), "0.00");
        assert_eq!(format_coordinate(-0.004), "0.00");
        assert_eq!(format_coordinate(-0.25), "-0.25");
    }

    #[test]
    fn test_projected_rounding_noise_is_written_as_zero() {
        let config = BlockConfig::new(BlockSize::Large);
        let bound_box = block_bounds(&config);
        // A front face whose left edge pokes out of the box by a millimetre.
        let corners = [
            Vec3::new(-1.251, -1.25, -1.25),
            Vec3::new(1.25, -1.25, -1.25),
            Vec3::new(1.25, -1.25, 1.25),
            Vec3::new(-1.251, -1.25, 1.25),
        ];
        let mp = project_polygon(corners, Vec3::NEG_Y, &bound_box, 0.4).unwrap();
        assert_eq!(mp.side, Side::Front);
        assert!(mp.start.x < 0.0);

        let xml = mount_points_xml(&[mp]).to_xml_string();
        assert_eq!(
            xml,
            "<MountPoints><MountPoint Side=\"Front\" StartX=\"0.00\" StartY=\"0.00\" EndX=\"1.00\" EndY=\"1.00\" /></MountPoints>"
        );
    }

    #[test]
    fn test_attribute_order_and_pretty_output() {
        let mps = [
            MountPoint::new(Side::Front, Vec2::new(0.1, 0.2), Vec2::new(0.9, 0.8)),
            MountPoint::new(Side::Left, Vec2::ZERO, Vec2::ONE),
        ];
        let mut doc = mount_points_xml(&mps);
        let root = doc.root();
        doc.pretty(root, "\t");
        assert_eq!(
            doc.to_xml_string(),
            "<MountPoints>\n\
             \t<MountPoint Side=\"Front\" StartX=\"0.10\" StartY=\"0.20\" EndX=\"0.90\" EndY=\"0.80\" />\n\
             \t<MountPoint Side=\"Left\" StartX=\"0.00\" StartY=\"0.00\" EndX=\"1.00\" EndY=\"1.00\" />\n\
             </MountPoints>\n"
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(mount_points_xml(&[]).to_xml_string(), "<MountPoints />");
    }
}

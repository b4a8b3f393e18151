//! Scene-document generators for integration tests.
//!
//! The documents are small but complete: every section the converter reads
//! is present, with namespaced tags like real exports.

use std::io::Result;
use std::path::Path;

const IDENTITY: &str = "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1";
/// 90° about Z plus a translation of 3 along Z, document row-major.
const ROT_Z_90_LIFTED: &str = "0 -1 0 0 1 0 0 0 0 0 1 3 0 0 0 1";

/// A rigged two-triangle strip with a three-bone chain (Root -> Mid -> Tip).
///
/// The triangles share two corners, so 6 corner indices collapse to 4
/// vertices. Root animates over two keyframes, the second a quarter turn
/// about Z lifted by 3.
pub fn generate_worm_dae(path: &Path) -> Result<()> {
    let doc = format!(
        r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_geometries>
    <geometry id="worm-mesh" name="worm">
      <mesh>
        <source id="worm-mesh-positions">
          <float_array id="worm-mesh-positions-array" count="12">0 0 0 1 0 0 1 1 0 0 1 0</float_array>
        </source>
        <source id="worm-mesh-normals">
          <float_array id="worm-mesh-normals-array" count="6">0 0 1 0 1 0</float_array>
        </source>
        <source id="worm-mesh-map-0">
          <float_array id="worm-mesh-map-0-array" count="8">0 0 1 0 1 1 0 1</float_array>
        </source>
        <triangles count="2">
          <p>0 0 0 1 0 1 2 0 2 2 0 2 1 0 1 3 1 3</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>
  <library_controllers>
    <controller id="worm-skin">
      <skin source="#worm-mesh">
        <bind_shape_matrix>{IDENTITY}</bind_shape_matrix>
        <source id="worm-skin-joints">
          <Name_array id="worm-skin-joints-array" count="3">Root Mid Tip</Name_array>
        </source>
        <source id="worm-skin-bind_poses">
          <float_array id="worm-skin-bind_poses-array" count="48">{IDENTITY} {IDENTITY} {IDENTITY}</float_array>
        </source>
        <source id="worm-skin-weights">
          <float_array id="worm-skin-weights-array" count="5">1 0.6 0.4 0.3 0.7</float_array>
        </source>
        <vertex_weights count="4">
          <vcount>2 2 1 1</vcount>
          <v>0 1 1 2 1 3 2 4 2 0 0 0</v>
        </vertex_weights>
      </skin>
    </controller>
  </library_controllers>
  <library_animations>
    <animation id="action">
      <animation id="worm-Root">
        <source id="worm-Root-matrix-input">
          <float_array count="2">0 0.5</float_array>
        </source>
        <source id="worm-Root-matrix-output">
          <float_array count="32">{IDENTITY} {ROT_Z_90_LIFTED}</float_array>
        </source>
      </animation>
      <animation id="worm-Mid">
        <source id="worm-Mid-matrix-input">
          <float_array count="1">0</float_array>
        </source>
        <source id="worm-Mid-matrix-output">
          <float_array count="16">{IDENTITY}</float_array>
        </source>
      </animation>
      <animation id="worm-Tip">
        <source id="worm-Tip-matrix-input">
          <float_array count="1">0</float_array>
        </source>
        <source id="worm-Tip-matrix-output">
          <float_array count="16">{IDENTITY}</float_array>
        </source>
      </animation>
    </animation>
  </library_animations>
  <library_visual_scenes>
    <visual_scene id="Scene">
      <node id="Armature">
        <node sid="Root">
          <matrix>{IDENTITY}</matrix>
          <node sid="Mid">
            <matrix>{IDENTITY}</matrix>
            <node sid="Tip">
              <matrix>{IDENTITY}</matrix>
            </node>
          </node>
        </node>
      </node>
    </visual_scene>
  </library_visual_scenes>
</COLLADA>"##
    );
    std::fs::write(path, doc)
}

/// A single unrigged triangle (geometry sections only).
pub fn generate_rock_dae(path: &Path) -> Result<()> {
    let doc = r#"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_geometries>
    <geometry id="rock-mesh">
      <mesh>
        <source id="rock-mesh-positions">
          <float_array count="9">0 0 0 2 0 0 0 2 0</float_array>
        </source>
        <source id="rock-mesh-normals">
          <float_array count="3">0 0 1</float_array>
        </source>
        <source id="rock-mesh-map-0">
          <float_array count="6">0 0 1 0 0 1</float_array>
        </source>
        <triangles count="1">
          <p>0 0 0 1 0 1 2 0 2</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>
</COLLADA>"#;
    std::fs::write(path, doc)
}

/// A geometry section with no triangle list; conversion must fail.
pub fn generate_broken_dae(path: &Path) -> Result<()> {
    let doc = r#"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_geometries>
    <geometry id="broken-mesh">
      <mesh>
        <source id="broken-mesh-positions">
          <float_array count="3">0 0 0</float_array>
        </source>
        <source id="broken-mesh-normals">
          <float_array count="3">0 0 1</float_array>
        </source>
        <source id="broken-mesh-map-0">
          <float_array count="2">0 0</float_array>
        </source>
      </mesh>
    </geometry>
  </library_geometries>
</COLLADA>"#;
    std::fs::write(path, doc)
}

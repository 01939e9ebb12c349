//! Mesh layer integration: generator, block pattern and coloring together.

use nf_mesh::{BlockPattern, ChannelSpec, EdgeColoring, build_channel};

fn channel() -> nf_mesh::Mesh {
    build_channel(&ChannelSpec {
        nx: 7,
        ny: 4,
        lx: 3.0,
        ly: 1.0,
    })
    .unwrap()
}

#[test]
fn every_edge_has_four_distinct_slots_in_the_right_rows() {
    let mesh = channel();
    let pattern = BlockPattern::from_mesh(&mesh);
    assert_eq!(pattern.n_rows(), mesh.nodes().len());
    assert_eq!(pattern.n_blocks(), mesh.nodes().len() + 2 * mesh.edges().len());

    for edge in mesh.edges() {
        let eb = pattern.edge_blocks(edge.id).unwrap();
        let (i, j) = (edge.i().idx(), edge.j().idx());
        assert!(pattern.row(i).contains(&eb.ii));
        assert!(pattern.row(i).contains(&eb.ij));
        assert!(pattern.row(j).contains(&eb.ji));
        assert!(pattern.row(j).contains(&eb.jj));
        assert_eq!(pattern.col(eb.ij), j);
        assert_eq!(pattern.col(eb.ji), i);
        assert_eq!(pattern.diag(i), eb.ii);
    }
}

#[test]
fn coloring_covers_all_edges_once() {
    let mesh = channel();
    let coloring = EdgeColoring::greedy(&mesh);
    assert!(coloring.is_valid_for(&mesh));
    let mut seen = vec![false; mesh.edges().len()];
    for group in coloring.groups() {
        for e in group {
            assert!(!seen[e.idx()]);
            seen[e.idx()] = true;
        }
    }
    assert!(seen.into_iter().all(|s| s));
}

#[test]
fn wall_markers_point_out_of_the_channel() {
    let mesh = channel();
    let lower = mesh.marker_by_name("lower_wall").unwrap();
    let upper = mesh.marker_by_name("upper_wall").unwrap();
    assert_eq!(lower.vertices.len(), 7);
    assert!(lower.vertices.iter().all(|v| v.normal[1] < 0.0));
    assert!(upper.vertices.iter().all(|v| v.normal[1] > 0.0));

    for v in &lower.vertices {
        let d = mesh.wall_normal_distance(v);
        assert!((d - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(mesh.node(v.node).unwrap().wall_distance, 0.0);
    }
}

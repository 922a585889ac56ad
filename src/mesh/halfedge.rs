//! Half-edge mesh connectivity store.
//!
//! # Structure
//!
//! - Every edge is stored as two **half-edges** allocated next to each other,
//!   so the opposite of a half-edge is found without a lookup
//! - Each half-edge knows its **origin**, the **next** and **prev** half-edge
//!   around its face (or around its hole), and its **face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge of its cycle
//!
//! # Boundary Handling
//!
//! A half-edge without a face is a boundary half-edge. Boundary half-edges
//! are linked with `next`/`prev` into closed cycles, one per hole, running in
//! the direction a face filling the hole would use. The outgoing half-edge of
//! a boundary vertex is always a boundary half-edge, which keeps
//! [`HalfEdgeMesh::is_boundary_vertex`] O(1).
//!
//! # Deletion
//!
//! Faces are removed by marking them deleted; storage is only reclaimed (and
//! handles renumbered) by [`HalfEdgeMesh::garbage_collection`].

use nalgebra::{Point3, Vector2, Vector3};

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Texture coordinate carried through repair and export.
    pub tex_coord: Vector2<f64>,

    /// One outgoing half-edge, invalid for isolated vertices.
    pub halfedge: HalfEdgeId<I>,

    pub(crate) deleted: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            tex_coord: Vector2::zeros(),
            halfedge: HalfEdgeId::invalid(),
            deleted: false,
        }
    }

    /// Whether the vertex is waiting for garbage collection.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// A directed half-edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge leaves.
    pub origin: VertexId<I>,

    /// Next half-edge around the face or hole.
    pub next: HalfEdgeId<I>,

    /// Previous half-edge around the face or hole.
    pub prev: HalfEdgeId<I>,

    /// Incident face; invalid on the boundary.
    pub face: FaceId<I>,

    pub(crate) deleted: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    fn leaving(origin: VertexId<I>) -> Self {
        Self {
            origin,
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            deleted: false,
        }
    }

    /// Check if this half-edge has no face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The half-edge leaving the first vertex of the face.
    pub halfedge: HalfEdgeId<I>,

    pub(crate) deleted: bool,
}

impl<I: MeshIndex> Face<I> {
    fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            deleted: false,
        }
    }
}

/// Manifold half-edge mesh.
///
/// Owns every vertex, half-edge and face; all relations are stored as
/// handles into its arrays.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,

    deleted_vertices: usize,
    deleted_edges: usize,
    deleted_faces: usize,
    has_tex_coords: bool,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed triangle mesh: E = 3F/2, so HE = 3F; leave room for boundary.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            deleted_vertices: 0,
            deleted_edges: 0,
            deleted_faces: 0,
            has_tex_coords: false,
        }
    }

    // ==================== Counts ====================

    /// Number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() - self.deleted_vertices
    }

    /// Number of live half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len() - 2 * self.deleted_edges
    }

    /// Number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len() - self.deleted_faces
    }

    /// Number of live boundary half-edges.
    pub fn num_boundary_halfedges(&self) -> usize {
        self.halfedge_ids()
            .filter(|&he| self.is_boundary_halfedge(he))
            .count()
    }

    /// True when no half-edge lies on the boundary.
    pub fn is_closed(&self) -> bool {
        self.num_boundary_halfedges() == 0
    }

    /// Whether deleted elements are waiting for [`garbage_collection`](Self::garbage_collection).
    pub fn has_garbage(&self) -> bool {
        self.deleted_vertices + self.deleted_edges + self.deleted_faces > 0
    }

    /// Whether texture coordinates were supplied for this mesh.
    pub fn has_tex_coords(&self) -> bool {
        self.has_tex_coords
    }

    // ==================== Accessors ====================

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Get the texture coordinate of a vertex.
    #[inline]
    pub fn tex_coord(&self, v: VertexId<I>) -> &Vector2<f64> {
        &self.vertex(v).tex_coord
    }

    /// Set the texture coordinate of a vertex.
    pub fn set_tex_coord(&mut self, v: VertexId<I>, uv: Vector2<f64>) {
        self.vertex_mut(v).tex_coord = uv;
        self.has_tex_coords = true;
    }

    /// Whether `v` refers to a live vertex of this mesh.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId<I>) -> bool {
        v.is_valid() && v.index() < self.vertices.len() && !self.vertices[v.index()].deleted
    }

    // ==================== Topology Queries ====================

    /// Get the opposite half-edge.
    #[inline]
    pub fn opposite(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        he.opposite()
    }

    /// Get the next half-edge around the face or hole.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face or hole.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(he.opposite())
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary (or isolated).
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let he = self.vertex(v).halfedge;
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    /// Check if an edge (represented by one of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(he.opposite())
    }

    /// Find the half-edge going from `from` to `to`, if the edge exists.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&he| self.dest(he) == to)
    }

    // ==================== Iteration ====================

    /// Iterate over live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.deleted)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, he)| !he.deleted)
            .map(|(i, _)| HalfEdgeId::new(i))
    }

    /// Iterate over live face IDs in storage order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.deleted)
            .map(|(i, _)| FaceId::new(i))
    }

    /// Iterate over half-edges leaving a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v)
            .map(|he| self.face_of(he))
            .filter(|f| f.is_valid())
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Get the three vertices of a triangular face, counter-clockwise.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Unit normal of a face; the zero vector for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        e1.cross(&e2)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Area-weighted normal at a vertex; zero for isolated vertices.
    pub fn vertex_normal(&self, v: VertexId<I>) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for f in self.vertex_faces(v) {
            let [p0, p1, p2] = self.face_positions(f);
            normal += (p1 - p0).cross(&(p2 - p0));
        }
        normal
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the bounding box of the live vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.vertex_ids().map(|v| *self.position(v));
        let first = positions.next()?;

        Some(positions.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Add a new isolated vertex carrying a texture coordinate.
    pub fn add_vertex_with_tex_coord(
        &mut self,
        position: Point3<f64>,
        tex_coord: Vector2<f64>,
    ) -> VertexId<I> {
        let id = self.add_vertex(position);
        self.set_tex_coord(id, tex_coord);
        id
    }

    /// Add a triangle.
    pub fn add_triangle(
        &mut self,
        a: VertexId<I>,
        b: VertexId<I>,
        c: VertexId<I>,
    ) -> Result<FaceId<I>> {
        self.add_face(&[a, b, c])
    }

    /// Add a face through the given vertices, in order.
    ///
    /// Existing boundary half-edges between consecutive vertices are reused,
    /// missing edges are created, and the boundary cycles around the new face
    /// are spliced so the mesh stays manifold. The mesh is left untouched
    /// when an error is returned.
    pub fn add_face(&mut self, vertices: &[VertexId<I>]) -> Result<FaceId<I>> {
        let n = vertices.len();
        let face_index = self.faces.len();

        if n < 3 {
            return Err(MeshError::InsufficientPoints {
                required: 3,
                actual: n,
            });
        }

        for (i, &v) in vertices.iter().enumerate() {
            if !self.contains_vertex(v) {
                return Err(MeshError::InvalidVertexIndex {
                    face: face_index,
                    vertex: v.index(),
                });
            }
            if vertices[i + 1..].contains(&v) {
                return Err(MeshError::DegenerateFace { face: face_index });
            }
        }

        let mut halfedges = Vec::with_capacity(n);
        let mut is_new = Vec::with_capacity(n);

        for i in 0..n {
            let from = vertices[i];
            let to = vertices[(i + 1) % n];

            if !self.is_boundary_vertex(from) {
                return Err(MeshError::ComplexVertex {
                    vertex: from.index(),
                });
            }

            match self.find_halfedge(from, to) {
                Some(he) if !self.is_boundary_halfedge(he) => {
                    return Err(MeshError::ComplexEdge {
                        from: from.index(),
                        to: to.index(),
                    });
                }
                Some(he) => {
                    halfedges.push(he);
                    is_new.push(false);
                }
                None => {
                    halfedges.push(HalfEdgeId::invalid());
                    is_new.push(true);
                }
            }
        }

        // Links are collected first and applied at the end, so every query
        // below sees the connectivity as it was before the face existed.
        let mut next_cache: Vec<(HalfEdgeId<I>, HalfEdgeId<I>)> = Vec::with_capacity(6 * n);

        // Two existing boundary half-edges meeting at a vertex must be
        // consecutive; otherwise move the patch between them into another gap.
        for i in 0..n {
            let ii = (i + 1) % n;
            if is_new[i] || is_new[ii] {
                continue;
            }

            let inner_prev = halfedges[i];
            let inner_next = halfedges[ii];
            if self.next(inner_prev) == inner_next {
                continue;
            }

            let outer_prev = inner_next.opposite();
            let mut boundary_prev = outer_prev;
            let mut steps = 0;
            loop {
                boundary_prev = self.next(boundary_prev).opposite();
                if self.is_boundary_halfedge(boundary_prev) {
                    break;
                }
                steps += 1;
                if boundary_prev == outer_prev || steps > self.halfedges.len() {
                    return Err(MeshError::PatchRelinkFailed {
                        vertex: vertices[ii].index(),
                    });
                }
            }

            if boundary_prev == inner_prev {
                return Err(MeshError::PatchRelinkFailed {
                    vertex: vertices[ii].index(),
                });
            }

            let boundary_next = self.next(boundary_prev);
            let patch_start = self.next(inner_prev);
            let patch_end = self.prev(inner_next);

            next_cache.push((boundary_prev, patch_start));
            next_cache.push((patch_end, boundary_next));
            next_cache.push((inner_prev, inner_next));
        }

        for i in 0..n {
            if is_new[i] {
                halfedges[i] = self.new_edge(vertices[i], vertices[(i + 1) % n]);
            }
        }

        let face = FaceId::new(face_index);
        self.faces.push(Face::new(halfedges[0]));

        let mut needs_adjust = vec![false; n];

        for i in 0..n {
            let ii = (i + 1) % n;
            let vh = vertices[ii];
            let inner_prev = halfedges[i];
            let inner_next = halfedges[ii];

            match (is_new[i], is_new[ii]) {
                (false, false) => {
                    needs_adjust[ii] = self.vertex(vh).halfedge == inner_next;
                }
                (true, false) => {
                    let outer_next = inner_prev.opposite();
                    let boundary_prev = self.prev(inner_next);
                    next_cache.push((boundary_prev, outer_next));
                    self.vertex_mut(vh).halfedge = outer_next;
                    next_cache.push((inner_prev, inner_next));
                }
                (false, true) => {
                    let outer_prev = inner_next.opposite();
                    let boundary_next = self.next(inner_prev);
                    next_cache.push((outer_prev, boundary_next));
                    self.vertex_mut(vh).halfedge = boundary_next;
                    next_cache.push((inner_prev, inner_next));
                }
                (true, true) => {
                    let outer_prev = inner_next.opposite();
                    let outer_next = inner_prev.opposite();
                    let boundary_next = self.vertex(vh).halfedge;
                    if boundary_next.is_valid() {
                        let boundary_prev = self.prev(boundary_next);
                        next_cache.push((boundary_prev, outer_next));
                        next_cache.push((outer_prev, boundary_next));
                    } else {
                        self.vertex_mut(vh).halfedge = outer_next;
                        next_cache.push((outer_prev, outer_next));
                    }
                    next_cache.push((inner_prev, inner_next));
                }
            }

            self.halfedge_mut(inner_prev).face = face;
        }

        for (a, b) in next_cache {
            self.set_next(a, b);
        }

        for (i, &v) in vertices.iter().enumerate() {
            if needs_adjust[i] {
                self.adjust_outgoing_halfedge(v);
            }
        }

        Ok(face)
    }

    /// Allocate an edge as a pair of unlinked boundary half-edges and
    /// return the one leaving `from`.
    fn new_edge(&mut self, from: VertexId<I>, to: VertexId<I>) -> HalfEdgeId<I> {
        let he = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge::leaving(from));
        self.halfedges.push(HalfEdge::leaving(to));
        he
    }

    #[inline]
    fn set_next(&mut self, he: HalfEdgeId<I>, next: HalfEdgeId<I>) {
        self.halfedge_mut(he).next = next;
        self.halfedge_mut(next).prev = he;
    }

    /// Point a boundary vertex at one of its outgoing boundary half-edges.
    fn adjust_outgoing_halfedge(&mut self, v: VertexId<I>) {
        let boundary = self
            .vertex_halfedges(v)
            .find(|&he| self.is_boundary_halfedge(he));
        if let Some(he) = boundary {
            self.vertex_mut(v).halfedge = he;
        }
    }

    // ==================== Deletion ====================

    /// Mark a face deleted.
    ///
    /// Its half-edges become boundary half-edges; edges left without a face
    /// on either side are deleted and the surrounding boundary cycles are
    /// re-linked. Vertices left without edges are deleted as well when
    /// `delete_isolated_vertices` is set.
    pub fn delete_face(&mut self, f: FaceId<I>, delete_isolated_vertices: bool) {
        if self.face(f).deleted {
            return;
        }

        let cycle: Vec<HalfEdgeId<I>> = self.face_halfedges(f).collect();
        let mut dead_edges = Vec::new();
        let mut touched = Vec::with_capacity(cycle.len());

        for &he in &cycle {
            self.halfedge_mut(he).face = FaceId::invalid();
            if self.is_boundary_halfedge(he.opposite()) {
                dead_edges.push(he);
            }
            touched.push(self.dest(he));
        }

        for h0 in dead_edges {
            let h1 = h0.opposite();

            let v0 = self.dest(h0);
            let next0 = self.next(h0);
            let prev0 = self.prev(h0);

            let v1 = self.dest(h1);
            let next1 = self.next(h1);
            let prev1 = self.prev(h1);

            self.set_next(prev0, next1);
            self.set_next(prev1, next0);

            self.halfedge_mut(h0).deleted = true;
            self.halfedge_mut(h1).deleted = true;
            self.deleted_edges += 1;

            self.detach_outgoing(v0, h1, next0, delete_isolated_vertices);
            self.detach_outgoing(v1, h0, next1, delete_isolated_vertices);
        }

        self.faces[f.index()].deleted = true;
        self.deleted_faces += 1;

        for v in touched {
            if !self.vertex(v).deleted {
                self.adjust_outgoing_halfedge(v);
            }
        }
    }

    /// Move a vertex off an outgoing half-edge that is being deleted.
    fn detach_outgoing(
        &mut self,
        v: VertexId<I>,
        dying: HalfEdgeId<I>,
        replacement: HalfEdgeId<I>,
        delete_isolated: bool,
    ) {
        if self.vertex(v).halfedge != dying {
            return;
        }

        if replacement == dying {
            self.vertex_mut(v).halfedge = HalfEdgeId::invalid();
            if delete_isolated && !self.vertex(v).deleted {
                self.vertex_mut(v).deleted = true;
                self.deleted_vertices += 1;
            }
        } else {
            self.vertex_mut(v).halfedge = replacement;
        }
    }

    /// Drop deleted elements and renumber the survivors.
    ///
    /// Every handle held outside the mesh is invalidated.
    pub fn garbage_collection(&mut self) {
        if !self.has_garbage() {
            return;
        }

        let mut vertex_map = vec![VertexId::invalid(); self.vertices.len()];
        let mut next_vertex = 0;
        for (i, v) in self.vertices.iter().enumerate() {
            if !v.deleted {
                vertex_map[i] = VertexId::new(next_vertex);
                next_vertex += 1;
            }
        }

        let mut halfedge_map = vec![HalfEdgeId::invalid(); self.halfedges.len()];
        let mut next_halfedge = 0;
        for (i, he) in self.halfedges.iter().enumerate().step_by(2) {
            if !he.deleted {
                halfedge_map[i] = HalfEdgeId::new(next_halfedge);
                halfedge_map[i + 1] = HalfEdgeId::new(next_halfedge + 1);
                next_halfedge += 2;
            }
        }

        let mut face_map = vec![FaceId::invalid(); self.faces.len()];
        let mut next_face = 0;
        for (i, f) in self.faces.iter().enumerate() {
            if !f.deleted {
                face_map[i] = FaceId::new(next_face);
                next_face += 1;
            }
        }

        let remap_he = |he: HalfEdgeId<I>| {
            if he.is_valid() {
                halfedge_map[he.index()]
            } else {
                he
            }
        };

        self.vertices.retain(|v| !v.deleted);
        for v in &mut self.vertices {
            v.halfedge = remap_he(v.halfedge);
        }

        self.halfedges.retain(|he| !he.deleted);
        for he in &mut self.halfedges {
            he.origin = vertex_map[he.origin.index()];
            he.next = remap_he(he.next);
            he.prev = remap_he(he.prev);
            if he.face.is_valid() {
                he.face = face_map[he.face.index()];
            }
        }

        self.faces.retain(|f| !f.deleted);
        for f in &mut self.faces {
            f.halfedge = remap_he(f.halfedge);
        }

        self.deleted_vertices = 0;
        self.deleted_edges = 0;
        self.deleted_faces = 0;
    }

    // ==================== Validation ====================

    /// Check that all live connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for v in self.vertex_ids() {
            let he = self.vertex(v).halfedge;
            if !he.is_valid() {
                continue;
            }
            if self.halfedge(he).deleted || self.origin(he) != v {
                return false;
            }
            // A boundary vertex must advertise a boundary half-edge.
            if !self.is_boundary_halfedge(he)
                && self.vertex_halfedges(v).any(|h| self.is_boundary_halfedge(h))
            {
                return false;
            }
        }

        for he in self.halfedge_ids() {
            let data = self.halfedge(he);
            if !data.next.is_valid() || !data.prev.is_valid() {
                return false;
            }
            if self.prev(data.next) != he || self.next(data.prev) != he {
                return false;
            }
            if self.origin(data.next) != self.dest(he) {
                return false;
            }
            if self.face_of(data.next) != data.face {
                return false;
            }
            if self.halfedge(he.opposite()).deleted {
                return false;
            }
        }

        for f in self.face_ids() {
            let he = self.face(f).halfedge;
            if !he.is_valid() || self.face_of(he) != f {
                return false;
            }
        }

        true
    }
}

/// Iterator over half-edges leaving a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.halfedges.len() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let result = self.current;

        // opposite(he) arrives at v; the half-edge after it leaves v again.
        let next = self.mesh.next(result.opposite());
        self.remaining -= 1;
        if next == self.start || !next.is_valid() {
            self.remaining = 0;
        }
        self.current = next;

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices(mesh: &mut HalfEdgeMesh) -> [VertexId; 4] {
        [
            mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)),
            mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)),
            mesh.add_vertex(Point3::new(1.0, 1.0, 0.0)),
            mesh.add_vertex(Point3::new(0.0, 1.0, 0.0)),
        ]
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_add_single_triangle() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let [a, b, c, _] = quad_vertices(&mut mesh);

        let f = mesh.add_triangle(a, b, c).unwrap();

        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_halfedges(), 6);
        assert_eq!(mesh.num_boundary_halfedges(), 3);
        assert_eq!(mesh.face_triangle(f), [a, b, c]);
        assert!(mesh.is_valid());
        assert!(mesh.is_boundary_vertex(a));

        // The boundary cycle runs against the face.
        let he = mesh.find_halfedge(b, a).unwrap();
        assert!(mesh.is_boundary_halfedge(he));
        assert_eq!(mesh.dest(mesh.next(he)), c);
    }

    #[test]
    fn test_add_adjacent_triangles() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let [a, b, c, d] = quad_vertices(&mut mesh);

        mesh.add_triangle(a, b, c).unwrap();
        mesh.add_triangle(a, c, d).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_halfedges(), 10);
        assert_eq!(mesh.num_boundary_halfedges(), 4);
        assert!(mesh.is_valid());
        assert!(!mesh.is_boundary_edge(mesh.find_halfedge(a, c).unwrap()));
    }

    #[test]
    fn test_face_closing_a_hole() {
        // Tetrahedron built face by face; the last face reuses three
        // existing boundary half-edges.
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = mesh.add_vertex(Point3::new(0.5, 1.0, 0.0));
        let v3 = mesh.add_vertex(Point3::new(0.5, 0.5, 1.0));

        mesh.add_triangle(v0, v1, v3).unwrap();
        mesh.add_triangle(v1, v2, v3).unwrap();
        mesh.add_triangle(v2, v0, v3).unwrap();
        assert_eq!(mesh.num_boundary_halfedges(), 3);

        mesh.add_triangle(v0, v2, v1).unwrap();
        assert!(mesh.is_closed());
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v));
            assert_eq!(mesh.vertex_halfedges(v).count(), 3);
        }
    }

    #[test]
    fn test_complex_edge_rejected() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let [a, b, c, d] = quad_vertices(&mut mesh);
        mesh.add_triangle(a, b, c).unwrap();

        // a -> b already carries a face.
        let err = mesh.add_triangle(a, b, d).unwrap_err();
        assert!(matches!(err, MeshError::ComplexEdge { .. }));
        assert_eq!(mesh.num_faces(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_degenerate_and_short_faces_rejected() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let [a, b, _, _] = quad_vertices(&mut mesh);

        assert!(matches!(
            mesh.add_face(&[a, b, a]),
            Err(MeshError::DegenerateFace { .. })
        ));
        assert!(matches!(
            mesh.add_face(&[a, b]),
            Err(MeshError::InsufficientPoints { required: 3, actual: 2 })
        ));
        assert!(matches!(
            mesh.add_face(&[a, b, VertexId::new(17)]),
            Err(MeshError::InvalidVertexIndex { vertex: 17, .. })
        ));
    }

    #[test]
    fn test_bowtie_vertex() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let c = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let a = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        let d = mesh.add_vertex(Point3::new(-1.0, 0.0, 0.0));
        let e = mesh.add_vertex(Point3::new(-1.0, -1.0, 0.0));

        mesh.add_triangle(c, a, b).unwrap();
        mesh.add_triangle(c, d, e).unwrap();

        assert!(mesh.is_valid());
        let boundary_out = mesh
            .vertex_halfedges(c)
            .filter(|&he| mesh.is_boundary_halfedge(he))
            .count();
        assert_eq!(boundary_out, 2);
    }

    #[test]
    fn test_delete_face_and_collect() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let [a, b, c, d] = quad_vertices(&mut mesh);
        mesh.add_triangle(a, b, c).unwrap();
        let f = mesh.add_triangle(a, c, d).unwrap();

        mesh.delete_face(f, true);

        assert!(mesh.has_garbage());
        assert_eq!(mesh.num_faces(), 1);
        // Edges c-d and d-a vanish with the face, the diagonal survives.
        assert_eq!(mesh.num_halfedges(), 6);
        assert_eq!(mesh.num_vertices(), 3);
        assert!(mesh.is_valid());

        mesh.garbage_collection();

        assert!(!mesh.has_garbage());
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.halfedges.len(), 6);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.num_boundary_halfedges(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_face_normal_and_area() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let [a, b, c, _] = quad_vertices(&mut mesh);
        let f = mesh.add_triangle(a, b, c).unwrap();

        assert_eq!(mesh.face_normal(f), Vector3::new(0.0, 0.0, 1.0));
        assert!((mesh.face_area(f) - 0.5).abs() < 1e-12);
        assert_eq!(mesh.vertex_normal(b), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let f = mesh.add_triangle(a, b, c).unwrap();

        assert_eq!(mesh.face_normal(f), Vector3::zeros());
    }
}

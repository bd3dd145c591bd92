// Weighted quick-union without path compression.
// https://en.wikipedia.org/wiki/Disjoint-set_data_structure
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct QuickUnion {
	len: usize,
	parent: Vec<usize>,
	size: Vec<usize>,
}

impl QuickUnion {
	pub fn new(len: usize) -> QuickUnion {
		QuickUnion {
			len,
			parent: (0..len).collect(),
			size: vec![1; len],
		}
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn parents(&self) -> &[usize] {
		&self.parent
	}

	/// Tree sizes; an entry is only current when read at a root.
	pub fn sizes(&self) -> &[usize] {
		&self.size
	}

	pub fn find_root(&self, x: usize) -> usize {
		assert!(x < self.len, "element {} out of range for {} elements", x, self.len);
		let mut x = x;
		while self.parent[x] != x {
			x = self.parent[x];
		}
		x
	}

	pub fn connected(&self, p: usize, q: usize) -> bool {
		self.find_root(p) == self.find_root(q)
	}

	/// Merges the components of `p` and `q`.
	///
	/// The tie-break reads the sizes stored at `p` and `q` themselves rather
	/// than at their roots, so a stale non-root size can decide which tree
	/// is attached. Traces depend on this ordering.
	pub fn union(&mut self, p: usize, q: usize) {
		let root_p = self.find_root(p);
		let root_q = self.find_root(q);
		if root_p == root_q {
			return;
		}
		if self.size[q] < self.size[p] {
			self.parent[root_p] = root_q;
			self.size[root_q] += self.size[root_p];
		} else {
			self.parent[root_q] = root_p;
			self.size[root_p] += self.size[root_q];
		}
	}

	pub fn component_size(&self, x: usize) -> usize {
		self.size[self.find_root(x)]
	}

	pub fn roots<'a>(&'a self) -> impl Iterator<Item = usize> + 'a {
		(0..self.len).filter(move |&i| self.parent[i] == i)
	}

	pub fn count(&self) -> usize {
		self.roots().count()
	}

	/// True when a root reachable from the first row of the implied
	/// `sqrt(len)` square is also reachable from the last row.
	pub fn percolates(&self) -> bool {
		let side = isqrt(self.len);
		let top: HashSet<usize> = (0..side)
			.map(|i| self.find_root(self.parent[i]))
			.collect();
		let bottom: HashSet<usize> = (self.len - side..self.len)
			.map(|i| self.find_root(self.parent[i]))
			.collect();
		top.iter().any(|root| bottom.contains(root))
	}
}

fn isqrt(n: usize) -> usize {
	let mut side = (n as f64).sqrt() as usize;
	while side * side > n {
		side -= 1;
	}
	while (side + 1) * (side + 1) <= n {
		side += 1;
	}
	side
}

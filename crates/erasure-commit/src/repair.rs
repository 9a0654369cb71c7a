use crate::{
    bitmatrix::BitMatrix,
    erasure::Codec,
    error::RepairError,
    grid::Grid,
    scheme::TreeConstructorFn,
    square::ExtendedDataSquare,
};
use eds_primitives::{Axis, Chunk, Root};
use log::{debug, trace, warn};

/// The trusted roots of one axis
fn expected<'a>(row_roots: &'a [Root], col_roots: &'a [Root], axis: Axis) -> &'a [Root] {
    match axis {
        Axis::Row => row_roots,
        Axis::Column => col_roots,
    }
}

/// Repair an incomplete extended data square against its expected row and
/// column roots. `chunks` is the row-major square with `None` for every
/// missing chunk.
///
/// Either every chunk is recovered and every row and column matches its
/// root, or the repair fails. A byzantine error names the axis whose data
/// contradicts its commitment.
pub fn repair(
    row_roots: &[Root],
    col_roots: &[Root],
    chunks: Vec<Option<Chunk>>,
    codec: Box<dyn Codec>,
    create_tree: TreeConstructorFn,
) -> Result<ExtendedDataSquare, RepairError> {
    let width = Grid::<Chunk>::square_dimensions(chunks.len());
    if row_roots.len() != width || col_roots.len() != width {
        return Err(RepairError::InvalidInput(format!(
            "expected {} row and column roots, got {} and {}",
            width,
            row_roots.len(),
            col_roots.len()
        )));
    }

    let mut bitmask = BitMatrix::new(width);
    let mut chunk_size = None;
    for (i, chunk) in chunks.iter().enumerate() {
        if let Some(chunk) = chunk {
            bitmask.set_flat(i);
            chunk_size.get_or_insert(chunk.len());
        }
    }
    let chunk_size = match chunk_size {
        Some(size) if size > 0 => size,
        _ => return Err(RepairError::Unrepairable),
    };
    debug!(
        "repairing square: width({}), known({}/{}), chunk_size({})",
        width,
        bitmask.count(),
        chunks.len(),
        chunk_size
    );

    // Placeholders are never trusted, the bitmask keeps them marked absent
    let filled = chunks
        .into_iter()
        .map(|c| c.unwrap_or_else(|| vec![0u8; chunk_size]))
        .collect();
    let mut eds = ExtendedDataSquare::import(filled, codec, create_tree)?;

    eds.prerepair_sanity_check(row_roots, col_roots, &bitmask)?;
    eds.solve_crossword(row_roots, col_roots, &mut bitmask)?;
    Ok(eds)
}

impl ExtendedDataSquare {
    /// Commit to `vector` as axis `index` and compare against the expected
    /// root, returning the root when they match.
    pub fn verify_against_roots(
        &self,
        row_roots: &[Root],
        col_roots: &[Root],
        axis: Axis,
        index: usize,
        vector: &[Chunk],
    ) -> Result<Root, RepairError> {
        let root = self.commit(index, vector);
        if root != expected(row_roots, col_roots, axis)[index] {
            warn!("{} {} does not match its root", axis, index);
            return Err(RepairError::byzantine(axis, index));
        }
        Ok(root)
    }

    /// Reject complete axes that disagree with their roots or their own parity
    /// before any of them is used to reconstruct another.
    pub(crate) fn prerepair_sanity_check(
        &self,
        row_roots: &[Root],
        col_roots: &[Root],
        bitmask: &BitMatrix,
    ) -> Result<(), RepairError> {
        let k = self.original_data_width();
        for i in 0..self.width() {
            let complete: Vec<Axis> = Axis::ALL
                .into_iter()
                .filter(|axis| bitmask.is_one(*axis, i))
                .collect();

            for axis in &complete {
                if self.axis_root(*axis, i) != expected(row_roots, col_roots, *axis)[i] {
                    return Err(RepairError::BadRootInput { axis: *axis, index: i });
                }
            }

            for axis in &complete {
                let vector = self.axis(*axis, i);
                let parity = self.codec.encode(&vector[..k])?;
                if parity[..] != vector[k..] {
                    warn!("{} {} has inconsistent parity", axis, i);
                    return Err(RepairError::byzantine(*axis, i));
                }
            }
        }
        Ok(())
    }

    /// Repeatedly decode every incomplete row and column until the square is
    /// complete, or a sweep makes no progress.
    pub(crate) fn solve_crossword(
        &mut self,
        row_roots: &[Root],
        col_roots: &[Root],
        bitmask: &mut BitMatrix,
    ) -> Result<(), RepairError> {
        let mut sweeps = 0;
        loop {
            sweeps += 1;
            let mut solved = true;
            let mut progress_made = false;

            for i in 0..self.width() {
                for axis in Axis::ALL {
                    if bitmask.is_one(axis, i) {
                        continue;
                    }
                    if self.solve_axis(row_roots, col_roots, bitmask, axis, i)? {
                        progress_made = true;
                    } else {
                        solved = false;
                    }
                }
            }

            debug!(
                "sweep {}: known({}), solved({}), progress({})",
                sweeps,
                bitmask.count(),
                solved,
                progress_made
            );
            if solved {
                return Ok(());
            } else if !progress_made {
                return Err(RepairError::Unrepairable);
            }
        }
    }

    /// Try to complete one axis. Returns false when it cannot be decoded yet.
    fn solve_axis(
        &mut self,
        row_roots: &[Root],
        col_roots: &[Root],
        bitmask: &mut BitMatrix,
        axis: Axis,
        index: usize,
    ) -> Result<bool, RepairError> {
        let width = self.width();
        let k = self.original_data_width();
        let parity_incomplete = !bitmask.range_is_one(axis, index, k, width);

        let shares: Vec<Option<Chunk>> = self
            .axis(axis, index)
            .into_iter()
            .enumerate()
            .map(|(j, chunk)| {
                let (r, c) = axis.cell(index, j);
                bitmask.get(r, c).then_some(chunk)
            })
            .collect();

        let mut rebuilt = match self.codec.decode(&shares) {
            Ok(data) => data,
            Err(e) => {
                trace!("{} {} not decodable yet: {}", axis, index, e);
                return Ok(false);
            }
        };
        if rebuilt.len() != k {
            return Err(RepairError::Codec(eyre::eyre!(
                "decoded {} chunks, expected {}",
                rebuilt.len(),
                k
            )));
        }

        if parity_incomplete {
            let parity = self.codec.encode(&rebuilt)?;
            rebuilt.extend(parity);
        } else {
            // Parity that is already known is kept verbatim
            rebuilt.extend(shares[k..].iter().flatten().cloned());
        }

        // Known chunks are never overwritten, so they must agree with the codeword
        let contradicted = (0..width)
            .find(|j| matches!(&shares[*j], Some(share) if *share != rebuilt[*j]));
        if let Some(j) = contradicted {
            warn!("{} {} contradicts its known chunk {}", axis, index, j);
            return Err(RepairError::byzantine(axis, index));
        }

        self.verify_against_roots(row_roots, col_roots, axis, index, &rebuilt)?;

        // Orthogonal axes completed by this one were never decoded, so their
        // roots are checked here, with the value about to be written.
        let orthogonal = axis.orthogonal();
        for (j, chunk) in rebuilt.iter().enumerate() {
            if shares[j].is_some() || !bitmask.is_one_except(orthogonal, j, index) {
                continue;
            }
            let mut vector = self.axis(orthogonal, j);
            vector[index] = chunk.clone();
            self.verify_against_roots(row_roots, col_roots, orthogonal, j, &vector)?;
        }

        bitmask.set_axis(axis, index);
        for (j, chunk) in rebuilt.into_iter().enumerate() {
            let (r, c) = axis.cell(index, j);
            self.set_cell(r, c, chunk);
        }
        trace!("solved {} {}", axis, index);
        Ok(true)
    }
}

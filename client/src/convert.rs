use grpc_types::face::Matrix;
use ndarray::{Array2, ArrayView2};

use crate::error::FaroError;

pub fn matrix_to_array(matrix: Matrix) -> Result<Array2<f32>, FaroError> {
    let shape = matrix.shape();
    Array2::from_shape_vec(shape, matrix.data).map_err(|err| {
        FaroError::MalformedResponse(format!("matrix data does not fit {shape:?}: {err}"))
    })
}

pub fn array_to_matrix(array: ArrayView2<f32>) -> Result<Matrix, FaroError> {
    let (rows, cols) = array.dim();
    let to_dimension = |value: usize| {
        i32::try_from(value)
            .map_err(|_| FaroError::InvalidArgument(format!("matrix dimension {value} too large")))
    };
    Ok(Matrix {
        rows: to_dimension(rows)?,
        cols: to_dimension(cols)?,
        data: array.iter().copied().collect(),
    })
}

///A dense matrix stored by rows. Used for the group-to-group trunking and the router distances of a topology.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Matrix<T>
{
	data: Vec<T>,
	num_columns: usize,
}

impl<T> Matrix<T>
{
	///Read a matrix entry.
	pub fn get(&self,row:usize,column:usize) -> &T
	{
		&self.data[row*self.num_columns+column]
	}
	///Read/write a matrix entry.
	pub fn get_mut(&mut self,row:usize,column:usize) -> &mut T
	{
		&mut self.data[row*self.num_columns+column]
	}
	pub fn get_rows(&self) -> usize
	{
		if self.num_columns==0 { 0 } else { self.data.len()/self.num_columns }
	}
	///Build a matrix with constant values.
	pub fn constant(value:T,num_rows:usize,num_columns:usize) -> Matrix<T> where T:Clone
	{
		Matrix{
			data: vec![value;num_rows*num_columns],
			num_columns,
		}
	}
	///The entries of a row, as a slice.
	pub fn row(&self,row:usize) -> &[T]
	{
		&self.data[row*self.num_columns..(row+1)*self.num_columns]
	}
	/// Iterate over elements outside the diagonal, by rows.
	pub fn outside_diagonal(&self) -> impl Iterator<Item=&T>
	{
		let num_columns = self.num_columns;
		self.data.iter().enumerate().filter_map(move |(index,value)|{
			if index/num_columns == index%num_columns { None } else { Some(value) }
		})
	}
	/// Iterate over the diagonal.
	pub fn diagonal(&self) -> impl Iterator<Item=&T>
	{
		let size = self.get_rows().min(self.num_columns);
		(0..size).map(move |index|self.get(index,index))
	}
}

mod test_diamond_tiling;

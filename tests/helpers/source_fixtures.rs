//! Common source fixtures for tests.

pub const SHAPES: &str = "package shapes

sealed class Shape
class Circle(val radius: Double) : Shape()
object Empty : Shape()
";

pub const SQUARE: &str = "package shapes

class Square(val side: Double) : Shape()
";

pub const COLORS: &str = "package paint

enum class Color { RED, GREEN, BLUE }
";

pub const SERVICE: &str = "package app

import shapes.Circle
import kotlin.collections.*

class Service {
    private val cache = 0
    fun area(c: Circle): Double = c.radius
    fun run(x: Int) {
        val doubled = x
        println()
    }
}
";
